//! The document store interface the rider screen reads from and writes to.
//!
//! The store is an external collaborator. Everything the screen needs from it
//! is captured by [`RequestStore`], so the Firestore client, the in-memory
//! fake and the client-side server-function proxy are interchangeable.

#[cfg(not(target_arch = "wasm32"))]
pub mod backend;
pub mod firestore;
pub mod memory;
pub mod server;

use serde_json::Value;
use thiserror::Error;

use crate::car_selection::CarSelectionRequest;
use crate::car_selection::RequestStatus;

/// The collection holding car-selection documents.
pub const CAR_SELECTION_COLLECTION: &str = "carSelection";

/// The only field this application ever writes.
pub const STATUS_FIELD: &str = "status";

/// Everything that can go wrong talking to a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store responded with {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// A response or document could not be decoded.
    #[error("failed to decode document: {0}")]
    Decode(String),

    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    /// The operation was refused before reaching the store.
    #[error("rejected: {0}")]
    Rejected(String),

    /// A server function call failed.
    #[error("server error: {0}")]
    Server(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// A document store holding car-selection records.
///
/// Implementations perform exactly one round trip per call. There is no
/// retrying, batching or caching at this layer.
pub trait RequestStore {
    /// Returns every document in `collection` whose `status` equals `status`,
    /// in the order the store returns them.
    async fn query_by_status(
        &self,
        collection: &str,
        status: RequestStatus,
    ) -> Result<Vec<CarSelectionRequest>, StoreError>;

    /// Sets a single field of an existing document.
    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError>;
}

//! Selects and holds the server-side store backend.

use std::env;
use std::path::PathBuf;

use dioxus_logger::tracing;
use serde_json::Value;
use tokio::sync::OnceCell;

use super::firestore::FirestoreStore;
use super::memory::MemoryStore;
use super::RequestStore;
use super::StoreError;
use super::CAR_SELECTION_COLLECTION;
use crate::car_selection::CarSelectionRequest;
use crate::car_selection::RequestStatus;
use crate::config::FirebaseConfig;

/// Which backend the server talks to.
#[derive(Clone, PartialEq, Debug)]
pub enum StoreConfig {
    Firestore(FirebaseConfig),
    /// An in-memory collection, optionally seeded from a JSON file holding an
    /// array of car-selection records.
    Memory { seed: Option<PathBuf> },
}

impl StoreConfig {
    /// Reads the backend choice from environment variables.
    ///
    /// # Environment Variables
    /// - `RIDER_STORE`: `firestore` (default) or `memory`.
    /// - `RIDER_STORE_SEED`: seed file for the memory backend.
    /// - see [`FirebaseConfig::from_env`] for the Firestore settings.
    pub fn from_env() -> Result<Self, StoreError> {
        let kind = env::var("RIDER_STORE").unwrap_or_default();
        if kind.eq_ignore_ascii_case("memory") {
            Ok(Self::Memory {
                seed: env::var_os("RIDER_STORE_SEED").map(PathBuf::from),
            })
        } else {
            Ok(Self::Firestore(FirebaseConfig::from_env()?))
        }
    }
}

#[derive(Debug)]
pub enum Backend {
    Firestore(FirestoreStore),
    Memory(MemoryStore),
}

impl Backend {
    pub async fn from_config(config: StoreConfig) -> Result<Self, StoreError> {
        match config {
            StoreConfig::Firestore(config) => {
                tracing::info!(
                    "using firestore project {} at {}",
                    config.project_id,
                    config.endpoint
                );
                Ok(Self::Firestore(FirestoreStore::new(config)))
            }
            StoreConfig::Memory { seed: None } => {
                tracing::info!("using empty in-memory store");
                Ok(Self::Memory(MemoryStore::new()))
            }
            StoreConfig::Memory { seed: Some(path) } => {
                let json = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| StoreError::Decode(format!("{}: {e}", path.display())))?;
                let requests: Vec<CarSelectionRequest> = serde_json::from_str(&json)?;
                tracing::info!(
                    "using in-memory store seeded with {} records from {}",
                    requests.len(),
                    path.display()
                );
                Ok(Self::Memory(MemoryStore::with_requests(
                    CAR_SELECTION_COLLECTION,
                    requests,
                )?))
            }
        }
    }
}

impl RequestStore for Backend {
    async fn query_by_status(
        &self,
        collection: &str,
        status: RequestStatus,
    ) -> Result<Vec<CarSelectionRequest>, StoreError> {
        match self {
            Self::Firestore(store) => store.query_by_status(collection, status).await,
            Self::Memory(store) => store.query_by_status(collection, status).await,
        }
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        match self {
            Self::Firestore(store) => store.update_field(collection, id, field, value).await,
            Self::Memory(store) => store.update_field(collection, id, field, value).await,
        }
    }
}

/// Returns the process-wide backend, creating it on first use.
///
/// A failed initialisation is not cached, so fixing the environment and
/// retrying works without a restart.
pub async fn shared_backend() -> Result<&'static Backend, StoreError> {
    static BACKEND: OnceCell<Backend> = OnceCell::const_new();

    BACKEND
        .get_or_try_init(|| async { Backend::from_config(StoreConfig::from_env()?).await })
        .await
}

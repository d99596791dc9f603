//! Client-side [`RequestStore`] that forwards to the fullstack server functions.

use serde_json::Value;

use super::RequestStore;
use super::StoreError;
use crate::car_selection::CarSelectionRequest;
use crate::car_selection::RequestStatus;

/// Proxies store calls through `/api/...` server functions. The server owns
/// the real backend and its credentials.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ServerStore;

impl RequestStore for ServerStore {
    async fn query_by_status(
        &self,
        collection: &str,
        status: RequestStatus,
    ) -> Result<Vec<CarSelectionRequest>, StoreError> {
        crate::query_by_status(collection.to_string(), status)
            .await
            .map_err(|e| StoreError::Server(e.to_string()))
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        crate::update_field(collection.to_string(), id.to_string(), field.to_string(), value)
            .await
            .map_err(|e| StoreError::Server(e.to_string()))
    }
}

//! Shared types, store access and fullstack server functions for the rider app.

pub mod car_selection;
pub mod config;
pub mod map;
pub mod prefs;
pub mod rider_requests;
pub mod store;

use dioxus::prelude::*;
use serde_json::Value;

use car_selection::CarSelectionRequest;
use car_selection::RequestStatus;
use prefs::user_prefs::UserPrefs;

pub type ApiError = anyhow::Error;

/// Retrieves the user's preferences.
///
/// In the future this may read from a settings file.  For now it just
/// returns the default settings, which read from env vars.
#[post("/api/get_user_prefs")]
pub async fn get_user_prefs() -> Result<UserPrefs, ApiError> {
    Ok(UserPrefs::default())
}

/// Returns every car selection in `collection` with the given status.
///
/// Only the car-selection collection is served.
#[post("/api/query_by_status")]
pub async fn query_by_status(
    collection: String,
    status: RequestStatus,
) -> Result<Vec<CarSelectionRequest>, ApiError> {
    server_side::check_collection(&collection)?;

    let backend = store::backend::shared_backend().await?;
    let requests = store::RequestStore::query_by_status(backend, &collection, status).await?;
    Ok(requests)
}

/// Sets one field of a car selection.
///
/// Only the `status` field may be written, and only to `accepted` or
/// `declined`.
#[post("/api/update_field")]
pub async fn update_field(
    collection: String,
    id: String,
    field: String,
    value: Value,
) -> Result<(), ApiError> {
    server_side::check_collection(&collection)?;
    server_side::check_status_write(&field, &value)?;

    let backend = store::backend::shared_backend().await?;
    store::RequestStore::update_field(backend, &collection, &id, &field, value).await?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
mod server_side {
    use std::str::FromStr;

    use serde_json::Value;

    use crate::car_selection::RequestStatus;
    use crate::store::StoreError;
    use crate::store::CAR_SELECTION_COLLECTION;
    use crate::store::STATUS_FIELD;

    pub fn check_collection(collection: &str) -> Result<(), StoreError> {
        if collection == CAR_SELECTION_COLLECTION {
            Ok(())
        } else {
            Err(StoreError::Rejected(format!(
                "collection {collection} is not served"
            )))
        }
    }

    pub fn check_status_write(field: &str, value: &Value) -> Result<(), StoreError> {
        if field != STATUS_FIELD {
            return Err(StoreError::Rejected(format!("field {field} is read-only")));
        }
        let status = value
            .as_str()
            .and_then(|s| RequestStatus::from_str(s).ok())
            .ok_or_else(|| StoreError::Rejected(format!("{value} is not a status")))?;
        if status.is_pending() {
            return Err(StoreError::Rejected(
                "a request cannot be moved back to pending".to_string(),
            ));
        }
        Ok(())
    }

}

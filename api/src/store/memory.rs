//! An in-memory document collection implementing [`RequestStore`].
//!
//! Used by tests and by the `RIDER_STORE=memory` demo backend. Documents keep
//! their insertion order, which is the order queries return them in.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use dioxus_logger::tracing;
use serde_json::Map;
use serde_json::Value;
use tokio::sync::RwLock;

use super::RequestStore;
use super::StoreError;
use super::STATUS_FIELD;
use crate::car_selection::CarSelectionRequest;
use crate::car_selection::RequestStatus;

#[derive(Clone, Debug)]
struct Document {
    collection: String,
    id: String,
    fields: Map<String, Value>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<Document>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose `collection` holds the given records.
    pub fn with_requests(
        collection: &str,
        requests: impl IntoIterator<Item = CarSelectionRequest>,
    ) -> Result<Self, StoreError> {
        let mut documents = Vec::new();
        for request in requests {
            let id = request.id.clone();
            let Value::Object(mut fields) = serde_json::to_value(&request)? else {
                return Err(StoreError::Decode(format!("{id} is not an object")));
            };
            fields.remove("id");
            documents.push(Document {
                collection: collection.to_string(),
                id,
                fields,
            });
        }
        Ok(Self {
            documents: RwLock::new(documents),
            ..Self::default()
        })
    }

    /// Makes every following query fail with a transport-like error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every following update fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of queries issued, including failed ones.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of updates issued, including failed ones.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns a stored record regardless of its status.
    pub async fn get(&self, collection: &str, id: &str) -> Option<CarSelectionRequest> {
        let documents = self.documents.read().await;
        documents
            .iter()
            .find(|d| d.collection == collection && d.id == id)
            .and_then(|d| CarSelectionRequest::from_document(&d.id, d.fields.clone()).ok())
    }
}

impl RequestStore for MemoryStore {
    async fn query_by_status(
        &self,
        collection: &str,
        status: RequestStatus,
    ) -> Result<Vec<CarSelectionRequest>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend {
                status: 503,
                message: "network request failed".to_string(),
            });
        }

        let documents = self.documents.read().await;
        let requests: Vec<CarSelectionRequest> = documents
            .iter()
            .filter(|d| d.collection == collection)
            .filter(|d| d.fields.get(STATUS_FIELD).and_then(Value::as_str) == Some(status.as_str()))
            .filter_map(|d| match CarSelectionRequest::from_document(&d.id, d.fields.clone()) {
                Ok(request) => Some(request),
                Err(e) => {
                    tracing::warn!("memory store: skipping undecodable document {}: {e}", d.id);
                    None
                }
            })
            .collect();

        tracing::debug!("memory store: {} {} documents in {}", requests.len(), status, collection);
        Ok(requests)
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend {
                status: 503,
                message: "network request failed".to_string(),
            });
        }

        let mut documents = self.documents.write().await;
        let document = documents
            .iter_mut()
            .find(|d| d.collection == collection && d.id == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        document.fields.insert(field.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CAR_SELECTION_COLLECTION;
    use serde_json::json;

    fn request(id: &str, status: RequestStatus) -> CarSelectionRequest {
        CarSelectionRequest {
            id: id.to_string(),
            pickup_name: format!("pickup {id}"),
            status,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn query_filters_by_status_and_keeps_order() {
        let store = MemoryStore::with_requests(
            CAR_SELECTION_COLLECTION,
            [
                request("c", RequestStatus::Pending),
                request("a", RequestStatus::Accepted),
                request("b", RequestStatus::Pending),
            ],
        )
        .unwrap();

        let pending = store
            .query_by_status(CAR_SELECTION_COLLECTION, RequestStatus::Pending)
            .await
            .unwrap();
        let ids: Vec<&str> = pending.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["c", "b"]);

        let other = store
            .query_by_status("otherCollection", RequestStatus::Pending)
            .await
            .unwrap();
        assert!(other.is_empty());
        assert_eq!(store.read_count(), 2);
    }

    #[tokio::test]
    async fn update_changes_only_the_named_field() {
        let store =
            MemoryStore::with_requests(CAR_SELECTION_COLLECTION, [request("a", RequestStatus::Pending)])
                .unwrap();

        store
            .update_field(CAR_SELECTION_COLLECTION, "a", STATUS_FIELD, json!("declined"))
            .await
            .unwrap();

        let stored = store.get(CAR_SELECTION_COLLECTION, "a").await.unwrap();
        assert_eq!(stored.status, RequestStatus::Declined);
        assert_eq!(stored.pickup_name, "pickup a");
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn mistyped_document_is_skipped_by_queries() {
        let store = MemoryStore::with_requests(
            CAR_SELECTION_COLLECTION,
            [
                request("a1", RequestStatus::Pending),
                request("b2", RequestStatus::Pending),
            ],
        )
        .unwrap();
        store
            .update_field(CAR_SELECTION_COLLECTION, "b2", "totalPrice", json!("650"))
            .await
            .unwrap();

        let pending = store
            .query_by_status(CAR_SELECTION_COLLECTION, RequestStatus::Pending)
            .await
            .unwrap();
        let ids: Vec<&str> = pending.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a1"]);
    }

    #[tokio::test]
    async fn update_of_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_field(CAR_SELECTION_COLLECTION, "nope", STATUS_FIELD, json!("accepted"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn failure_switches() {
        let store = MemoryStore::new();
        store.fail_reads(true);
        assert!(store
            .query_by_status(CAR_SELECTION_COLLECTION, RequestStatus::Pending)
            .await
            .is_err());

        store.fail_writes(true);
        assert!(store
            .update_field(CAR_SELECTION_COLLECTION, "a", STATUS_FIELD, json!("accepted"))
            .await
            .is_err());
        assert_eq!(store.read_count(), 1);
        assert_eq!(store.write_count(), 1);
    }
}

//! A [`RequestStore`] backed by the Firestore REST API.

use dioxus_logger::tracing;
use reqwest::Response;
use reqwest::Url;
use serde_json::json;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use super::RequestStore;
use super::StoreError;
use super::STATUS_FIELD;
use crate::car_selection::CarSelectionRequest;
use crate::car_selection::RequestStatus;
use crate::config::FirebaseConfig;

/// Talks to one Firestore database over HTTPS.
#[derive(Clone, Debug)]
pub struct FirestoreStore {
    client: reqwest::Client,
    config: FirebaseConfig,
}

impl FirestoreStore {
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// `{endpoint}/projects/{project}/databases/{database}/documents`
    fn documents_url(&self) -> Result<Url, StoreError> {
        let mut url = parse_url(&self.config.endpoint)?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Decode(format!("endpoint cannot be a base: {}", self.config.endpoint)))?
            .pop_if_empty()
            .extend([
                "projects",
                self.config.project_id.as_str(),
                "databases",
                self.config.database_id.as_str(),
                "documents",
            ]);
        Ok(url)
    }

    fn run_query_url(&self) -> Result<Url, StoreError> {
        let documents = self.documents_url()?;
        // `:runQuery` is a custom method suffix on the last segment, not a new segment.
        let mut url = parse_url(&format!("{}:runQuery", documents.as_str()))?;
        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
    }

    fn document_url(&self, collection: &str, id: &str, field: &str) -> Result<Url, StoreError> {
        let mut url = self.documents_url()?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Decode(format!("endpoint cannot be a base: {}", self.config.endpoint)))?
            .extend([collection, id]);
        url.query_pairs_mut()
            .append_pair("updateMask.fieldPaths", field)
            .append_pair("currentDocument.exists", "true")
            .append_pair("key", &self.config.api_key);
        Ok(url)
    }
}

impl RequestStore for FirestoreStore {
    async fn query_by_status(
        &self,
        collection: &str,
        status: RequestStatus,
    ) -> Result<Vec<CarSelectionRequest>, StoreError> {
        let body = status_query(collection, status);

        let resp = self
            .client
            .post(self.run_query_url()?)
            .json(&body)
            .send()
            .await?;
        let resp = check_response(resp).await?;

        let entries = resp.json::<Vec<Value>>().await?;
        let requests = decode_query_results(entries);
        tracing::info!(
            "firestore: {} {} documents in {}",
            requests.len(),
            status,
            collection
        );
        Ok(requests)
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut fields = Map::new();
        fields.insert(field.to_string(), encode_value(&value));
        let body = json!({ "fields": fields });

        let resp = self
            .client
            .patch(self.document_url(collection, id, field)?)
            .json(&body)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        check_response(resp).await?;
        tracing::info!("firestore: set {}/{}.{} = {}", collection, id, field, value);
        Ok(())
    }
}

fn parse_url(s: &str) -> Result<Url, StoreError> {
    Url::parse(s).map_err(|e| StoreError::Decode(format!("invalid url {s}: {e}")))
}

/// Turns a non-success response into [`StoreError::Backend`], preferring the
/// message from Firestore's error envelope over the raw body.
async fn check_response(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    Err(StoreError::Backend {
        status: status.as_u16(),
        message: error_message(&text),
    })
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// The `runQuery` body selecting every document in `collection` with the
/// given status.
pub(crate) fn status_query(collection: &str, status: RequestStatus) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": STATUS_FIELD },
                    "op": "EQUAL",
                    "value": { "stringValue": status.as_str() },
                }
            }
        }
    })
}

/// Decodes a `runQuery` response. Entries that carry no `document` (an empty
/// result still returns one entry with a `readTime`) are skipped, and so are
/// documents that fail to decode, so one bad record cannot hide the rest.
pub(crate) fn decode_query_results(entries: Vec<Value>) -> Vec<CarSelectionRequest> {
    entries
        .iter()
        .filter_map(|entry| entry.get("document"))
        .filter_map(|document| match decode_document(document) {
            Ok(request) => Some(request),
            Err(e) => {
                tracing::warn!("firestore: skipping undecodable document: {e}");
                None
            }
        })
        .collect()
}

fn decode_document(document: &Value) -> Result<CarSelectionRequest, StoreError> {
    let name = document
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Decode("document without a name".to_string()))?;
    let id = name.rsplit('/').next().unwrap_or(name);

    let mut fields = Map::new();
    if let Some(Value::Object(raw)) = document.get("fields") {
        for (key, value) in raw {
            if let Some(decoded) = decode_value(value) {
                fields.insert(key.clone(), decoded);
            }
        }
    }

    CarSelectionRequest::from_document(id, fields)
        .map_err(|e| StoreError::Decode(format!("{name}: {e}")))
}

/// Converts a Firestore typed value into plain JSON.
///
/// Returns `None` for value kinds a car-selection document never carries
/// (timestamps, references, geo points, bytes).
pub(crate) fn decode_value(value: &Value) -> Option<Value> {
    let (kind, inner) = value.as_object()?.iter().next()?;
    match kind.as_str() {
        "nullValue" => Some(Value::Null),
        "booleanValue" => inner.as_bool().map(Value::Bool),
        "stringValue" => inner.as_str().map(|s| Value::String(s.to_string())),
        // int64 values are sent as strings
        "integerValue" => match inner {
            Value::String(s) => s.parse::<i64>().ok().map(Value::from),
            Value::Number(n) => Some(Value::Number(n.clone())),
            _ => None,
        },
        "doubleValue" => match inner {
            Value::Number(n) => Some(Value::Number(n.clone())),
            // NaN and the infinities arrive as strings and have no JSON form
            _ => None,
        },
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().filter_map(decode_value).collect())
                .unwrap_or_default();
            Some(Value::Array(values))
        }
        "mapValue" => {
            let mut map = Map::new();
            if let Some(Value::Object(fields)) = inner.get("fields") {
                for (key, value) in fields {
                    if let Some(decoded) = decode_value(value) {
                        map.insert(key.clone(), decoded);
                    }
                }
            }
            Some(Value::Object(map))
        }
        _ => None,
    }
}

/// Converts plain JSON into a Firestore typed value.
pub(crate) fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Number(n) => encode_number(n),
        Value::Array(values) => {
            let values: Vec<Value> = values.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => {
            let fields: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), encode_value(v)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

fn encode_number(n: &Number) -> Value {
    match n.as_i64() {
        Some(i) => json!({ "integerValue": i.to_string() }),
        None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn store() -> FirestoreStore {
        FirestoreStore::new(FirebaseConfig::new("secret", "rider-app-d5e99"))
    }

    /// Answers exactly one HTTP request on a local port with the given status
    /// line and JSON body. Returns a store pointed at it, plus a handle that
    /// yields the request line the store sent.
    async fn stub_firestore(status: &'static str, body: &'static str) -> (FirestoreStore, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/v1", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
                    let length = head
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        let store = FirestoreStore {
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
            config: FirebaseConfig::new("k", "demo").with_endpoint(&endpoint),
        };
        (store, handle)
    }

    #[tokio::test]
    async fn patch_of_missing_document_is_not_found() {
        let (store, request) = stub_firestore(
            "404 Not Found",
            r#"{"error":{"code":404,"message":"No document to update","status":"NOT_FOUND"}}"#,
        )
        .await;

        let err = store
            .update_field("carSelection", "gone", "status", json!("accepted"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound { ref collection, ref id } if collection == "carSelection" && id == "gone"
        ));

        let request_line = request.await.unwrap();
        assert!(request_line.starts_with(
            "PATCH /v1/projects/demo/databases/(default)/documents/carSelection/gone?"
        ));
    }

    #[tokio::test]
    async fn denied_query_is_a_backend_error_with_envelope_message() {
        let (store, request) = stub_firestore(
            "403 Forbidden",
            r#"{"error":{"code":403,"message":"Missing or insufficient permissions.","status":"PERMISSION_DENIED"}}"#,
        )
        .await;

        let err = store
            .query_by_status("carSelection", RequestStatus::Pending)
            .await
            .unwrap_err();
        match err {
            StoreError::Backend { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Missing or insufficient permissions.");
            }
            other => panic!("expected a backend error, got {other:?}"),
        }

        let request_line = request.await.unwrap();
        assert!(request_line
            .starts_with("POST /v1/projects/demo/databases/(default)/documents:runQuery?key=k"));
    }

    #[tokio::test]
    async fn denied_patch_is_a_backend_error() {
        let (store, _request) = stub_firestore(
            "403 Forbidden",
            r#"{"error":{"code":403,"message":"Missing or insufficient permissions.","status":"PERMISSION_DENIED"}}"#,
        )
        .await;

        let err = store
            .update_field("carSelection", "a1", "status", json!("declined"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend { status: 403, .. }));
    }

    #[tokio::test]
    async fn query_with_no_matches_is_empty() {
        let (store, _request) =
            stub_firestore("200 OK", r#"[{"readTime":"2024-05-01T10:00:01.000000Z"}]"#).await;

        let requests = store
            .query_by_status("carSelection", RequestStatus::Pending)
            .await
            .unwrap();
        assert!(requests.is_empty());
    }

    #[test]
    fn builds_run_query_url() {
        let url = store().run_query_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/rider-app-d5e99/databases/(default)/documents:runQuery?key=secret"
        );
    }

    #[test]
    fn builds_patch_url_with_mask_and_escaped_id() {
        let url = store()
            .document_url("carSelection", "a 1", "status")
            .unwrap();
        assert_eq!(url.path(), "/v1/projects/rider-app-d5e99/databases/(default)/documents/carSelection/a%201");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("updateMask.fieldPaths".to_string(), "status".to_string()),
                ("currentDocument.exists".to_string(), "true".to_string()),
                ("key".to_string(), "secret".to_string()),
            ]
        );
    }

    #[test]
    fn emulator_endpoint_is_respected() {
        let store = FirestoreStore::new(
            FirebaseConfig::new("k", "demo").with_endpoint("http://127.0.0.1:8080/v1/"),
        );
        let url = store.run_query_url().unwrap();
        assert!(url
            .as_str()
            .starts_with("http://127.0.0.1:8080/v1/projects/demo/databases/(default)/documents:runQuery"));
    }

    #[test]
    fn status_query_filters_on_status() {
        let query = status_query("carSelection", RequestStatus::Pending);
        let filter = &query["structuredQuery"]["where"]["fieldFilter"];
        assert_eq!(query["structuredQuery"]["from"][0]["collectionId"], "carSelection");
        assert_eq!(filter["field"]["fieldPath"], "status");
        assert_eq!(filter["op"], "EQUAL");
        assert_eq!(filter["value"]["stringValue"], "pending");
    }

    #[test]
    fn decodes_query_results_in_order() {
        let entries: Vec<Value> = serde_json::from_value(json!([
            {
                "document": {
                    "name": "projects/p/databases/(default)/documents/carSelection/a1",
                    "fields": {
                        "pickupName": { "stringValue": "Mall" },
                        "dropoffName": { "stringValue": "Airport" },
                        "carType": { "stringValue": "Sedan" },
                        "totalPrice": { "integerValue": "1200" },
                        "distance": { "doubleValue": 14.5 },
                        "pickupLatitude": { "doubleValue": 24.86 },
                        "pickupLongitude": { "doubleValue": 67.0 },
                        "dropoffLatitude": { "nullValue": null },
                        "createdAt": { "timestampValue": "2024-05-01T10:00:00Z" },
                        "status": { "stringValue": "pending" }
                    }
                },
                "readTime": "2024-05-01T10:00:01Z"
            },
            {
                "document": {
                    "name": "projects/p/databases/(default)/documents/carSelection/b2",
                    "fields": { "status": { "stringValue": "pending" } }
                },
                "readTime": "2024-05-01T10:00:01Z"
            }
        ]))
        .unwrap();

        let requests = decode_query_results(entries);
        assert_eq!(requests.len(), 2);

        let a1 = &requests[0];
        assert_eq!(a1.id, "a1");
        assert_eq!(a1.pickup_name, "Mall");
        assert_eq!(a1.total_price, 1200.0);
        assert_eq!(a1.distance, 14.5);
        assert_eq!(a1.pickup_longitude, Some(67.0));
        assert_eq!(a1.dropoff_latitude, None);
        assert_eq!(requests[1].id, "b2");
    }

    #[test]
    fn empty_result_has_only_read_time() {
        let entries = vec![json!({ "readTime": "2024-05-01T10:00:01Z" })];
        assert!(decode_query_results(entries).is_empty());
    }

    #[test]
    fn bad_status_is_a_decode_error() {
        let document = json!({
            "name": "projects/p/databases/(default)/documents/carSelection/z",
            "fields": { "status": { "stringValue": "lost" } }
        });
        assert!(matches!(
            decode_document(&document),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn mistyped_document_does_not_hide_the_others() {
        let entries = vec![
            json!({
                "document": {
                    "name": "projects/p/databases/(default)/documents/carSelection/a1",
                    "fields": {
                        "totalPrice": { "integerValue": "1200" },
                        "status": { "stringValue": "pending" }
                    }
                }
            }),
            json!({
                "document": {
                    "name": "projects/p/databases/(default)/documents/carSelection/b2",
                    "fields": {
                        "totalPrice": { "stringValue": "650" },
                        "status": { "stringValue": "pending" }
                    }
                }
            }),
            json!({
                "document": {
                    "name": "projects/p/databases/(default)/documents/carSelection/z",
                    "fields": { "status": { "stringValue": "lost" } }
                }
            }),
        ];

        let requests = decode_query_results(entries);
        let ids: Vec<&str> = requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a1"]);
        assert_eq!(requests[0].total_price, 1200.0);
    }

    #[test]
    fn encodes_values_for_writes() {
        assert_eq!(encode_value(&json!("accepted")), json!({ "stringValue": "accepted" }));
        assert_eq!(encode_value(&json!(14)), json!({ "integerValue": "14" }));
        assert_eq!(encode_value(&json!(14.5)), json!({ "doubleValue": 14.5 }));
        assert_eq!(encode_value(&Value::Null), json!({ "nullValue": null }));
        assert_eq!(
            decode_value(&encode_value(&json!({ "tags": ["a", true] }))),
            Some(json!({ "tags": ["a", true] }))
        );
    }

    #[test]
    fn prefers_error_envelope_message() {
        let body = r#"{"error":{"code":403,"message":"Missing or insufficient permissions.","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(error_message(body), "Missing or insufficient permissions.");
        assert_eq!(error_message("upstream timeout"), "upstream timeout");
    }
}

//! Credentials and endpoint for the Firestore project backing the app.

use std::env;

use serde::Deserialize;
use serde::Serialize;

use crate::store::StoreError;

/// The Firebase project identity.
///
/// Only `api_key`, `project_id`, `database_id` and `endpoint` are used to talk
/// to Firestore. The remaining fields are carried so that one env file can
/// describe the whole Firebase app.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    pub endpoint: String,
    pub auth_domain: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
    pub measurement_id: Option<String>,
}

impl FirebaseConfig {
    pub const DEFAULT_DATABASE_ID: &'static str = "(default)";
    pub const DEFAULT_ENDPOINT: &'static str = "https://firestore.googleapis.com/v1";

    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            database_id: Self::DEFAULT_DATABASE_ID.to_string(),
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            auth_domain: None,
            storage_bucket: None,
            messaging_sender_id: None,
            app_id: None,
            measurement_id: None,
        }
    }

    /// Points the client at another endpoint, e.g. the local emulator.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Reads the config from environment variables.
    ///
    /// # Environment Variables
    /// - `FIREBASE_API_KEY`: required.
    /// - `FIREBASE_PROJECT_ID`: required.
    /// - `FIREBASE_DATABASE_ID`: defaults to `(default)`.
    /// - `FIRESTORE_ENDPOINT`: defaults to the public Firestore REST endpoint.
    /// - `FIREBASE_AUTH_DOMAIN`, `FIREBASE_STORAGE_BUCKET`,
    ///   `FIREBASE_MESSAGING_SENDER_ID`, `FIREBASE_APP_ID`,
    ///   `FIREBASE_MEASUREMENT_ID`: optional.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("FIREBASE_API_KEY").ok_or(StoreError::MissingConfig("FIREBASE_API_KEY"))?;
        let project_id =
            get("FIREBASE_PROJECT_ID").ok_or(StoreError::MissingConfig("FIREBASE_PROJECT_ID"))?;

        let mut config = Self::new(api_key, project_id);
        if let Some(database_id) = get("FIREBASE_DATABASE_ID") {
            config.database_id = database_id;
        }
        if let Some(endpoint) = get("FIRESTORE_ENDPOINT") {
            config = config.with_endpoint(endpoint);
        }
        config.auth_domain = get("FIREBASE_AUTH_DOMAIN");
        config.storage_bucket = get("FIREBASE_STORAGE_BUCKET");
        config.messaging_sender_id = get("FIREBASE_MESSAGING_SENDER_ID");
        config.app_id = get("FIREBASE_APP_ID");
        config.measurement_id = get("FIREBASE_MEASUREMENT_ID");

        Ok(config)
    }
}

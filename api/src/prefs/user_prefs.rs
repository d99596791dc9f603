use super::map_preference::MissingCoordinatePolicy;
use serde::Deserialize;
use serde::Serialize;
use std::env;

/// Represents all user prefs. Served to the client once at startup.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct UserPrefs {
    fare_currency_label: String,
    missing_coordinates: MissingCoordinatePolicy,
}

impl UserPrefs {
    pub const DEFAULT_FARE_CURRENCY_LABEL: &'static str = "PKR";

    pub fn new(fare_currency_label: impl Into<String>, missing_coordinates: MissingCoordinatePolicy) -> Self {
        Self {
            fare_currency_label: fare_currency_label.into(),
            missing_coordinates,
        }
    }

    /// Reads the prefs from environment variables.
    ///
    /// # Environment Variables
    /// - `FARE_CURRENCY_LABEL`: the label printed before every fare. Defaults to "PKR".
    /// - `MAP_MISSING_COORDINATES`: see [`MissingCoordinatePolicy::from_env`].
    pub fn from_env() -> Self {
        let label = env::var("FARE_CURRENCY_LABEL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_FARE_CURRENCY_LABEL.to_string());

        Self::new(label, MissingCoordinatePolicy::from_env())
    }

    pub fn fare_currency_label(&self) -> &str {
        &self.fare_currency_label
    }

    pub fn missing_coordinates(&self) -> MissingCoordinatePolicy {
        self.missing_coordinates
    }
}

impl Default for UserPrefs {
    fn default() -> Self {
        Self::from_env()
    }
}

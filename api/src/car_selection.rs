//! Defines the car-selection record as it is stored in the document database.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// The lifecycle state of a car-selection request.
///
/// The authoritative value lives in the document store; the variants
/// serialize to the lowercase strings stored in the `status` field.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIs,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RequestStatus {
    /// Awaiting a decision from the rider.
    #[default]
    Pending,
    Accepted,
    Declined,
}

impl RequestStatus {
    /// Returns the value written to the `status` field of a document.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate {
        latitude: 0.0,
        longitude: 0.0,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A pending, accepted or declined car selection made by a rider.
///
/// Records are created and deleted outside of this application. We only read
/// them and update their `status` field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarSelectionRequest {
    /// The document id assigned by the store.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub pickup_name: String,
    #[serde(default)]
    pub dropoff_name: String,
    #[serde(default)]
    pub car_type: String,
    #[serde(default)]
    pub total_price: f64,
    /// Trip distance in kilometres.
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub pickup_latitude: Option<f64>,
    #[serde(default)]
    pub pickup_longitude: Option<f64>,
    #[serde(default)]
    pub dropoff_latitude: Option<f64>,
    #[serde(default)]
    pub dropoff_longitude: Option<f64>,
    pub status: RequestStatus,
}

impl CarSelectionRequest {
    /// Builds a record from a document id and its decoded JSON fields.
    ///
    /// Any `id` stored inside the document body is ignored in favour of the
    /// document id.
    pub fn from_document(id: &str, mut fields: Map<String, Value>) -> serde_json::Result<Self> {
        fields.insert("id".to_string(), Value::String(id.to_string()));
        serde_json::from_value(Value::Object(fields))
    }

    /// The pickup point, if both of its components are present.
    pub fn pickup(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.pickup_latitude?, self.pickup_longitude?))
    }

    /// The dropoff point, if both of its components are present.
    pub fn dropoff(&self) -> Option<Coordinate> {
        Some(Coordinate::new(
            self.dropoff_latitude?,
            self.dropoff_longitude?,
        ))
    }
}

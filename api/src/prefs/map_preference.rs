use serde::Deserialize;
use serde::Serialize;
use std::env;
use std::str::FromStr;

/// How the map treats a record whose coordinates are partly or fully missing.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    Default,
    Serialize,
    Deserialize,
    strum::EnumIs,
    strum::EnumString,
    strum::Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MissingCoordinatePolicy {
    /// Substitute 0 for each missing latitude or longitude component.
    #[default]
    Origin,

    /// Leave out any marker whose point is incomplete, and center on the first
    /// complete point (pickup, then dropoff) instead.
    Omit,
}

impl MissingCoordinatePolicy {
    /// Reads `MAP_MISSING_COORDINATES` ("origin" or "omit"), falling back to
    /// [`MissingCoordinatePolicy::Origin`] when unset or unrecognized.
    pub fn from_env() -> Self {
        env::var("MAP_MISSING_COORDINATES")
            .ok()
            .and_then(|s| Self::from_str(s.trim()).ok())
            .unwrap_or_default()
    }
}

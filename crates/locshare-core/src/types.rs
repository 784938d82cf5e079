//! Shared data types.
//!
//! All types serialize as camelCase JSON so a UI layer can consume them
//! directly.

use serde::{Deserialize, Serialize};

/// Identifier reserved for the local device.
pub const USER_ID: &str = "user";

/// One known position report for a subject (the local device or a peer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Stable identity of the subject
    pub id: String,
    /// Display label
    pub name: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Reported uncertainty in meters (device reports only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

impl Location {
    /// Create a peer location without accuracy information.
    pub fn peer(
        id: impl Into<String>,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        timestamp: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            latitude,
            longitude,
            timestamp,
            accuracy: None,
        }
    }

    /// Whether this location belongs to the local device.
    pub fn is_self(&self) -> bool {
        self.id == USER_ID
    }

    /// Milliseconds elapsed since this report, relative to `now`.
    pub fn age_ms(&self, now: i64) -> i64 {
        now - self.timestamp
    }
}

/// A raw position as delivered by a geolocation capability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Uncertainty radius in meters
    pub accuracy: f64,
    /// Milliseconds since the Unix epoch at which the fix was taken
    pub timestamp: i64,
}

impl Position {
    /// Turn a raw fix into the local device's location entry.
    pub fn into_self_location(self, name: impl Into<String>) -> Location {
        Location {
            id: USER_ID.to_string(),
            name: name.into(),
            latitude: self.latitude,
            longitude: self.longitude,
            timestamp: self.timestamp,
            accuracy: Some(self.accuracy),
        }
    }
}

/// Options passed to the geolocation capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionOptions {
    /// Ask for the most accurate fix the platform can give
    pub high_accuracy: bool,
    /// Maximum age of a cached position the platform may return
    pub maximum_age_ms: u64,
    /// Acquisition timeout; `None` waits indefinitely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl PositionOptions {
    /// Options used for continuous tracking.
    pub const fn tracking() -> Self {
        Self {
            high_accuracy: true,
            maximum_age_ms: 30_000,
            timeout_ms: Some(27_000),
        }
    }
}

impl Default for PositionOptions {
    /// Platform defaults: low accuracy, no cached fixes, no timeout.
    fn default() -> Self {
        Self {
            high_accuracy: false,
            maximum_age_ms: 0,
            timeout_ms: None,
        }
    }
}

/// Where the UI should center its map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFocus {
    pub latitude: f64,
    pub longitude: f64,
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

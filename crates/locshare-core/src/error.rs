//! Error types for locshare core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type for shared operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Geolocation error: {0}")]
    Geolocation(#[from] GeolocationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Failures reported by a geolocation capability.
///
/// The three platform failures keep the numeric codes browsers and mobile
/// location APIs use, so they can be surfaced to a UI unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationError {
    #[error("Geolocation is not supported on this platform")]
    Unsupported,

    #[error("Permission to read the device location was denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("Timed out acquiring a position")]
    Timeout,
}

impl GeolocationError {
    /// Platform error code (1 = denied, 2 = unavailable, 3 = timeout).
    pub fn code(&self) -> Option<u8> {
        match self {
            GeolocationError::Unsupported => None,
            GeolocationError::PermissionDenied => Some(1),
            GeolocationError::PositionUnavailable(_) => Some(2),
            GeolocationError::Timeout => Some(3),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {message}")]
    Invalid { field: &'static str, message: String },

    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

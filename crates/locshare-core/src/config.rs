//! Tracker configuration.
//!
//! Tunables are read from a JSON file. Missing fields take their defaults,
//! so an empty object is a valid config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::ConfigError;
use crate::types::PositionOptions;

/// File name of the config inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Largest per-tick peer movement accepted, in degrees.
pub const MAX_JITTER_DEGREES: f64 = 1.0;

/// Get the default config file path.
///
/// Uses the `directories` crate to find the platform-specific config directory.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "locshare", "locshare")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Runtime tunables for a [`LocationTracker`](crate::tracker::LocationTracker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerConfig {
    /// Period of the simulated peer feed
    pub simulation_interval_ms: u64,
    /// Max offset applied to each coordinate per simulated move
    pub jitter_degrees: f64,
    /// Locations older than this are not active
    pub active_window_ms: u64,
    /// Label used for the local device while no display name is set
    pub fallback_name: String,
    /// Options for the continuous position subscription
    pub tracking: PositionOptions,
    /// Buffer size of the tracker event channel
    pub event_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            simulation_interval_ms: 10_000,
            jitter_degrees: 0.005,
            active_window_ms: 3_600_000,
            fallback_name: "You".to_string(),
            tracking: PositionOptions::tracking(),
            event_capacity: 64,
        }
    }
}

impl TrackerConfig {
    pub fn simulation_interval(&self) -> Duration {
        Duration::from_millis(self.simulation_interval_ms)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation_interval_ms == 0 {
            return Err(invalid("simulationIntervalMs", "must be greater than zero"));
        }

        if !(0.0..=MAX_JITTER_DEGREES).contains(&self.jitter_degrees) {
            return Err(invalid(
                "jitterDegrees",
                format!(
                    "must be between 0 and {} degrees, got {}",
                    MAX_JITTER_DEGREES, self.jitter_degrees
                ),
            ));
        }

        if self.active_window_ms == 0 {
            return Err(invalid("activeWindowMs", "must be greater than zero"));
        }

        if i64::try_from(self.active_window_ms).is_err() {
            return Err(invalid("activeWindowMs", "is too large"));
        }

        if self.event_capacity == 0 {
            return Err(invalid("eventCapacity", "must be greater than zero"));
        }

        Ok(())
    }

    /// Parse and validate a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: TrackerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).await?;
        Self::from_json(&text)
    }

    /// Load a config file, falling back to defaults when it does not exist.
    pub async fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !fs::try_exists(path).await? {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load(path).await
    }

    /// Write this config as pretty JSON, creating parent directories.
    pub async fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).await?;

        Ok(())
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}

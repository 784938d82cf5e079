//! JSON-formatted output for CLI.

use serde::Serialize;
use serde_json::json;

use super::OutputFormatter;
use locshare_core::{Location, MapFocus, TrackerConfig, TrackerEvent};

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_locations(
        &self,
        locations: &[Location],
        focus: Option<&MapFocus>,
        now: i64,
    ) -> String {
        Self::to_json(&json!({
            "locations": locations,
            "count": locations.len(),
            "mapFocus": focus,
            "generatedAt": now
        }))
    }

    /// One compact line per event (NDJSON).
    fn format_event(&self, event: &TrackerEvent, now: i64) -> String {
        let mut value = serde_json::to_value(event).unwrap_or_else(|_| json!({}));
        if let serde_json::Value::Object(ref mut map) = value {
            map.insert("receivedAt".to_string(), json!(now));
        }
        serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_config(&self, config: &TrackerConfig) -> String {
        Self::to_json(config)
    }

    fn format_message(&self, message: &str) -> String {
        Self::to_json(&json!({ "message": message }))
    }
}

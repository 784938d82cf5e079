//! Output formatting for CLI results.

pub mod json;
pub mod table;

pub use json::JsonOutput;
pub use table::TableOutput;

use locshare_core::{Location, MapFocus, TrackerConfig, TrackerEvent};

/// Output formatter trait
pub trait OutputFormatter {
    /// Format a location list, relative to `now` (ms since epoch)
    fn format_locations(&self, locations: &[Location], focus: Option<&MapFocus>, now: i64)
        -> String;

    /// Format a single tracker event
    fn format_event(&self, event: &TrackerEvent, now: i64) -> String;

    /// Format the effective configuration
    fn format_config(&self, config: &TrackerConfig) -> String;

    /// Format a generic message
    fn format_message(&self, message: &str) -> String;
}

/// Get the appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput::new())
    } else {
        Box::new(TableOutput::new())
    }
}

/// Human-readable age of a report, e.g. `4m 05s`.
pub fn format_age(age_ms: i64) -> String {
    if age_ms < 0 {
        return "just now".to_string();
    }

    let secs = age_ms / 1000;
    match secs {
        0..=59 => format!("{}s", secs),
        60..=3599 => format!("{}m {:02}s", secs / 60, secs % 60),
        _ => format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60),
    }
}

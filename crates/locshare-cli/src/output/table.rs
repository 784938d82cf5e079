//! Table-formatted output for CLI.

use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use super::{format_age, OutputFormatter};
use locshare_core::{Location, MapFocus, TrackerConfig, TrackerEvent};

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }

    fn name_cell(location: &Location) -> Cell {
        if location.is_self() {
            Cell::new(&location.name).fg(Color::Cyan)
        } else {
            Cell::new(&location.name)
        }
    }

    fn describe(location: &Location) -> String {
        format!(
            "{} ({}) at {:.5}, {:.5}",
            location.name, location.id, location.latitude, location.longitude
        )
    }
}

/// Wall-clock time of a report in UTC, e.g. `14:03:27`.
fn format_clock(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "?".to_string())
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableOutput {
    fn format_locations(
        &self,
        locations: &[Location],
        focus: Option<&MapFocus>,
        now: i64,
    ) -> String {
        if locations.is_empty() {
            return "No locations found.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            "ID", "Name", "Latitude", "Longitude", "Updated", "Age", "Accuracy",
        ]);

        for location in locations {
            let accuracy = location
                .accuracy
                .map(|a| format!("{:.0} m", a))
                .unwrap_or_else(|| "-".to_string());

            table.add_row(vec![
                Cell::new(&location.id),
                Self::name_cell(location),
                Cell::new(format!("{:.5}", location.latitude)),
                Cell::new(format!("{:.5}", location.longitude)),
                Cell::new(format_clock(location.timestamp)),
                Cell::new(format_age(location.age_ms(now))),
                Cell::new(accuracy),
            ]);
        }

        let mut out = format!("{}\n\n{} location(s)", table, locations.len());
        if let Some(focus) = focus {
            out.push_str(&format!(
                "\nMap centered on {:.5}, {:.5}",
                focus.latitude, focus.longitude
            ));
        }
        out
    }

    fn format_event(&self, event: &TrackerEvent, _now: i64) -> String {
        let tag = format!("[{}]", event.kind()).cyan();

        let detail = match event {
            TrackerEvent::LocationsUpdated { locations } => {
                format!("{} location(s) known", locations.len())
            }
            TrackerEvent::SelfLocationUpdated { location } => {
                let accuracy = location
                    .accuracy
                    .map(|a| format!(" ±{:.0} m", a))
                    .unwrap_or_default();
                format!("{}{}", Self::describe(location), accuracy)
            }
            TrackerEvent::TrackingChanged { tracking } => {
                if *tracking {
                    "tracking on".green().to_string()
                } else {
                    "tracking off".yellow().to_string()
                }
            }
            TrackerEvent::DisplayNameChanged { name } => format!("display name is '{}'", name),
            TrackerEvent::MapFocusChanged { focus } => {
                format!("map centered on {:.5}, {:.5}", focus.latitude, focus.longitude)
            }
        };

        format!("{} {}", tag, detail)
    }

    fn format_config(&self, config: &TrackerConfig) -> String {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Setting", "Value"]);

        let timeout = config
            .tracking
            .timeout_ms
            .map(|t| format!("{} ms", t))
            .unwrap_or_else(|| "none".to_string());

        let rows = [
            ("Simulation interval", format!("{} ms", config.simulation_interval_ms)),
            ("Peer jitter", format!("±{} deg", config.jitter_degrees)),
            ("Active window", format!("{} ms", config.active_window_ms)),
            ("Fallback name", config.fallback_name.clone()),
            ("High accuracy", config.tracking.high_accuracy.to_string()),
            ("Max cached age", format!("{} ms", config.tracking.maximum_age_ms)),
            ("Acquire timeout", timeout),
            ("Event capacity", config.event_capacity.to_string()),
        ];

        for (key, value) in rows {
            table.add_row(vec![Cell::new(key), Cell::new(value)]);
        }

        table.to_string()
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

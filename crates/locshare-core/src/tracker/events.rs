//! Change notifications pushed to UI consumers.

use serde::Serialize;

use crate::types::{Location, MapFocus};

/// A change to tracker state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TrackerEvent {
    /// The location collection changed; carries the full collection
    LocationsUpdated { locations: Vec<Location> },
    /// A new fix (or rename) for the local device
    SelfLocationUpdated { location: Location },
    TrackingChanged { tracking: bool },
    DisplayNameChanged { name: String },
    MapFocusChanged { focus: MapFocus },
}

impl TrackerEvent {
    /// Short event name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            TrackerEvent::LocationsUpdated { .. } => "locationsUpdated",
            TrackerEvent::SelfLocationUpdated { .. } => "selfLocationUpdated",
            TrackerEvent::TrackingChanged { .. } => "trackingChanged",
            TrackerEvent::DisplayNameChanged { .. } => "displayNameChanged",
            TrackerEvent::MapFocusChanged { .. } => "mapFocusChanged",
        }
    }
}

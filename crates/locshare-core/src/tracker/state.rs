//! Tracker state and the replace-by-id collection.

use serde::{Deserialize, Serialize};

use crate::geolocation::WatchId;
use crate::types::{Location, MapFocus, USER_ID};

/// Everything the tracker knows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    /// Known locations, at most one per id, in first-seen order
    pub locations: Vec<Location>,
    /// Most recent fix for the local device
    pub self_location: Option<Location>,
    /// User-chosen label for the local device
    pub display_name: String,
    /// Whether a continuous subscription is open
    pub tracking: bool,
    /// Handle of the open subscription
    #[serde(skip)]
    pub subscription: Option<WatchId>,
    /// Where the UI should center its map
    pub map_focus: Option<MapFocus>,
}

impl TrackerState {
    /// Insert or replace a location by id.
    ///
    /// Returns `true` when an existing entry was replaced.
    pub fn upsert(&mut self, location: Location) -> bool {
        match self.locations.iter_mut().find(|l| l.id == location.id) {
            Some(existing) => {
                *existing = location;
                true
            }
            None => {
                self.locations.push(location);
                false
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    /// Locations reported strictly within `window_ms` before `now`.
    pub fn active_locations_at(&self, now: i64, window_ms: i64) -> Vec<Location> {
        let cutoff = now - window_ms;
        self.locations
            .iter()
            .filter(|l| l.timestamp > cutoff)
            .cloned()
            .collect()
    }

    /// Record a new fix for the local device and publish it to the collection.
    pub fn record_self(&mut self, location: Location) {
        self.self_location = Some(location.clone());
        self.upsert(location);
    }

    /// Rename the local device without touching its coordinates.
    ///
    /// Returns `true` if a self location existed.
    pub fn rename_self(&mut self, name: &str) -> bool {
        if let Some(entry) = self.locations.iter_mut().find(|l| l.id == USER_ID) {
            entry.name = name.to_string();
        }

        match self.self_location.as_mut() {
            Some(loc) => {
                loc.name = name.to_string();
                true
            }
            None => false,
        }
    }
}

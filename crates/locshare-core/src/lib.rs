//! locshare core library.
//!
//! Tracks the local device's location alongside a set of peers. Device
//! positions come from a pluggable [`GeolocationProvider`]; peer movement is
//! simulated. Any UI layer (desktop, mobile, or the `locshare` CLI) drives a
//! [`LocationTracker`] and reads its state or subscribes to its events.

pub mod config;
pub mod error;
pub mod geolocation;
pub mod tracker;
pub mod types;

pub use config::TrackerConfig;
pub use error::{ConfigError, CoreError, GeolocationError, Result};
pub use geolocation::{GeolocationProvider, SimulatedGeolocation, UnsupportedGeolocation};
pub use tracker::{LocationTracker, TrackerEvent, TrackerState};
pub use types::{Location, MapFocus, Position, PositionOptions};

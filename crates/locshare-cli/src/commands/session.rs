//! Tracker setup shared by the watch and snapshot commands.

use locshare_core::{
    GeolocationProvider, LocationTracker, SimulatedGeolocation, TrackerConfig, TrackerEvent,
    UnsupportedGeolocation,
};
use tokio::sync::broadcast;

use crate::cli::SessionArgs;
use crate::error::CliError;

/// A running tracker and a receiver that saw every event since startup.
pub struct Session {
    pub tracker: LocationTracker,
    pub events: broadcast::Receiver<TrackerEvent>,
}

/// Check the simulated start point.
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), CliError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CliError::InvalidArgument(format!(
            "Latitude {} is outside -90..90",
            lat
        )));
    }

    if !(-180.0..=180.0).contains(&lon) {
        return Err(CliError::InvalidArgument(format!(
            "Longitude {} is outside -180..180",
            lon
        )));
    }

    Ok(())
}

fn build_tracker<P: GeolocationProvider>(
    provider: P,
    config: TrackerConfig,
    seed: Option<u64>,
) -> Result<LocationTracker, CliError> {
    let tracker = match seed {
        Some(seed) => LocationTracker::with_seed(provider, config, seed)?,
        None => LocationTracker::new(provider, config)?,
    };
    Ok(tracker)
}

/// Create, name and initialize a tracker, then start tracking if asked.
pub async fn start_session(args: &SessionArgs, config: TrackerConfig) -> Result<Session, CliError> {
    validate_coordinates(args.lat, args.lon)?;

    let tracker = if args.no_geolocation {
        build_tracker(UnsupportedGeolocation, config, args.seed)?
    } else {
        let provider = match args.seed {
            Some(seed) => SimulatedGeolocation::with_seed(args.lat, args.lon, seed),
            None => SimulatedGeolocation::new(args.lat, args.lon),
        };
        build_tracker(provider, config, args.seed)?
    };

    let events = tracker.subscribe();

    if let Some(name) = &args.name {
        tracker.set_display_name(name.as_str()).await;
    }

    tracker.initialize().await;

    if args.track {
        tracker.start_tracking().await;
    }

    Ok(Session { tracker, events })
}

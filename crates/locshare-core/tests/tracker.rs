use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use tokio::sync::{broadcast, mpsc};

use locshare_core::geolocation::{PositionResult, PositionWatch, WatchId};
use locshare_core::types::USER_ID;
use locshare_core::{
    GeolocationError, GeolocationProvider, LocationTracker, Position, PositionOptions,
    TrackerConfig, TrackerEvent, UnsupportedGeolocation,
};

const MINUTE_MS: i64 = 60_000;
const JITTER_BOUND: f64 = 0.005 + 1e-9;

#[derive(Default)]
struct ManualInner {
    one_shot: Option<PositionResult>,
    watches: HashMap<WatchId, mpsc::UnboundedSender<PositionResult>>,
    next_id: u64,
    opened: usize,
    cleared: Vec<WatchId>,
    last_options: Option<PositionOptions>,
}

/// Geolocation whose reports are pushed by the test.
#[derive(Clone, Default)]
struct ManualGeolocation {
    inner: Arc<Mutex<ManualInner>>,
}

impl ManualGeolocation {
    fn with_fix(position: Position) -> Self {
        let provider = Self::default();
        provider.inner.lock().unwrap().one_shot = Some(Ok(position));
        provider
    }

    fn push(&self, report: PositionResult) {
        for tx in self.inner.lock().unwrap().watches.values() {
            let _ = tx.send(report.clone());
        }
    }

    fn opened(&self) -> usize {
        self.inner.lock().unwrap().opened
    }

    fn open_watches(&self) -> usize {
        self.inner.lock().unwrap().watches.len()
    }

    fn cleared(&self) -> Vec<WatchId> {
        self.inner.lock().unwrap().cleared.clone()
    }

    fn last_options(&self) -> Option<PositionOptions> {
        self.inner.lock().unwrap().last_options
    }
}

impl GeolocationProvider for ManualGeolocation {
    fn current_position(&self, _options: PositionOptions) -> BoxFuture<'static, PositionResult> {
        let result = self
            .inner
            .lock()
            .unwrap()
            .one_shot
            .clone()
            .unwrap_or(Err(GeolocationError::PositionUnavailable(
                "no fix".to_string(),
            )));
        future::ready(result).boxed()
    }

    fn watch_position(&self, options: PositionOptions) -> Result<PositionWatch, GeolocationError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        inner.opened += 1;
        inner.last_options = Some(options);

        let id = WatchId(inner.next_id);
        inner.watches.insert(id, tx);

        Ok(PositionWatch { id, updates: rx })
    }

    fn clear_watch(&self, id: WatchId) {
        let mut inner = self.inner.lock().unwrap();
        if inner.watches.remove(&id).is_some() {
            inner.cleared.push(id);
        }
    }
}

fn fix(latitude: f64, longitude: f64, timestamp: i64) -> Position {
    Position {
        latitude,
        longitude,
        accuracy: 8.0,
        timestamp,
    }
}

async fn wait_for<F>(rx: &mut broadcast::Receiver<TrackerEvent>, mut matches: F) -> TrackerEvent
where
    F: FnMut(&TrackerEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(60), async {
        loop {
            let event = rx.recv().await.expect("event channel closed");
            if matches(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for tracker event")
}

fn is_self_update(event: &TrackerEvent) -> bool {
    matches!(event, TrackerEvent::SelfLocationUpdated { .. })
}

fn is_locations_update(event: &TrackerEvent) -> bool {
    matches!(event, TrackerEvent::LocationsUpdated { .. })
}

#[tokio::test]
async fn test_initialize_seeds_peers_and_requests_fix() {
    let provider = ManualGeolocation::with_fix(fix(48.85, 2.35, 1_000));
    let tracker = LocationTracker::new(provider, TrackerConfig::default()).unwrap();
    let mut events = tracker.subscribe();

    tracker.initialize().await;

    let names: Vec<String> = tracker.locations().await.into_iter().map(|l| l.name).collect();
    assert_eq!(names, vec!["John Doe", "Jane Smith", "Bob Johnson"]);

    wait_for(&mut events, is_self_update).await;

    let me = tracker.self_location().await.unwrap();
    assert_eq!(me.id, USER_ID);
    assert_eq!(me.name, "You");
    assert_eq!(me.latitude, 48.85);
    assert_eq!(me.accuracy, Some(8.0));

    // A one-shot fix is not published into the collection
    assert_eq!(tracker.locations().await.len(), 3);
    assert!(tracker.is_simulating());

    tracker.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_initialize_without_geolocation() {
    let tracker = LocationTracker::new(UnsupportedGeolocation, TrackerConfig::default()).unwrap();

    tracker.initialize().await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(tracker.self_location().await.is_none());
    assert_eq!(tracker.locations().await.len(), 3);
    assert!(tracker.is_simulating());
}

#[tokio::test(start_paused = true)]
async fn test_double_initialize_starts_one_feed() {
    let config = TrackerConfig {
        simulation_interval_ms: 1_000,
        ..TrackerConfig::default()
    };
    let tracker = LocationTracker::with_seed(UnsupportedGeolocation, config, 5).unwrap();

    tracker.initialize().await;
    let mut events = tracker.subscribe();
    tracker.initialize().await;

    tokio::time::sleep(Duration::from_millis(1_500)).await;

    let mut feed_updates = 0;
    while let Ok(event) = events.try_recv() {
        if is_locations_update(&event) {
            feed_updates += 1;
        }
    }
    assert_eq!(feed_updates, 1);
    assert_eq!(tracker.locations().await.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_feed_moves_one_peer_per_tick() {
    let tracker =
        LocationTracker::with_seed(UnsupportedGeolocation, TrackerConfig::default(), 11).unwrap();
    let mut events = tracker.subscribe();

    tracker.initialize().await;
    wait_for(&mut events, is_locations_update).await;
    let before = tracker.locations().await;

    wait_for(&mut events, is_locations_update).await;
    let after = tracker.locations().await;

    assert_eq!(before.len(), after.len());
    let changed: Vec<_> = before
        .iter()
        .zip(after.iter())
        .filter(|(old, new)| old != new)
        .collect();
    assert_eq!(changed.len(), 1);

    let (old, new) = changed[0];
    assert_eq!(old.id, new.id);
    assert!(new.timestamp > old.timestamp);
    assert!((new.latitude - old.latitude).abs() <= JITTER_BOUND);
    assert!((new.longitude - old.longitude).abs() <= JITTER_BOUND);
}

#[tokio::test]
async fn test_start_tracking_twice_opens_one_subscription() {
    let provider = ManualGeolocation::default();
    let tracker = LocationTracker::new(provider.clone(), TrackerConfig::default()).unwrap();

    tracker.start_tracking().await;
    tracker.start_tracking().await;

    assert!(tracker.is_tracking().await);
    assert_eq!(provider.opened(), 1);
    assert_eq!(provider.open_watches(), 1);
    assert_eq!(provider.last_options(), Some(PositionOptions::tracking()));
}

#[tokio::test]
async fn test_tracking_publishes_fixes_by_id() {
    let provider = ManualGeolocation::default();
    let tracker = LocationTracker::new(provider.clone(), TrackerConfig::default()).unwrap();
    let mut events = tracker.subscribe();

    tracker.start_tracking().await;

    provider.push(Ok(fix(1.0, 2.0, 100)));
    wait_for(&mut events, is_locations_update).await;
    provider.push(Ok(fix(1.5, 2.5, 200)));
    wait_for(&mut events, is_locations_update).await;

    let locations = tracker.locations().await;
    let mine: Vec<_> = locations.iter().filter(|l| l.id == USER_ID).collect();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].latitude, 1.5);
    assert_eq!(mine[0].timestamp, 200);
    assert_eq!(tracker.self_location().await.unwrap().timestamp, 200);
}

#[tokio::test]
async fn test_tracking_errors_keep_subscription_open() {
    let provider = ManualGeolocation::default();
    let tracker = LocationTracker::new(provider.clone(), TrackerConfig::default()).unwrap();
    let mut events = tracker.subscribe();

    tracker.start_tracking().await;
    provider.push(Err(GeolocationError::Timeout));
    provider.push(Err(GeolocationError::PermissionDenied));
    provider.push(Ok(fix(3.0, 4.0, 300)));

    wait_for(&mut events, is_self_update).await;

    assert!(tracker.is_tracking().await);
    assert_eq!(tracker.self_location().await.unwrap().latitude, 3.0);
}

#[tokio::test]
async fn test_start_tracking_unsupported() {
    let tracker = LocationTracker::new(UnsupportedGeolocation, TrackerConfig::default()).unwrap();

    tracker.start_tracking().await;

    assert!(!tracker.is_tracking().await);
    assert!(tracker.snapshot().await.subscription.is_none());
}

#[tokio::test]
async fn test_stop_tracking_when_idle_is_noop() {
    let provider = ManualGeolocation::default();
    let tracker = LocationTracker::new(provider.clone(), TrackerConfig::default()).unwrap();
    let mut events = tracker.subscribe();

    tracker.stop_tracking().await;

    assert!(!tracker.is_tracking().await);
    assert!(provider.cleared().is_empty());
    assert!(matches!(
        events.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn test_stop_tracking_cancels_subscription() {
    let provider = ManualGeolocation::default();
    let tracker = LocationTracker::new(provider.clone(), TrackerConfig::default()).unwrap();

    tracker.start_tracking().await;
    let id = tracker.snapshot().await.subscription.unwrap();

    tracker.stop_tracking().await;

    assert!(!tracker.is_tracking().await);
    assert!(tracker.snapshot().await.subscription.is_none());
    assert_eq!(provider.cleared(), vec![id]);
    assert_eq!(provider.open_watches(), 0);

    provider.push(Ok(fix(9.0, 9.0, 900)));
    tokio::task::yield_now().await;
    assert!(tracker.self_location().await.is_none());

    // Tracking can be restarted with a fresh subscription
    tracker.start_tracking().await;
    assert_eq!(provider.opened(), 2);
}

#[tokio::test]
async fn test_set_display_name_renames_current_fix() {
    let provider = ManualGeolocation::default();
    let tracker = LocationTracker::new(provider.clone(), TrackerConfig::default()).unwrap();
    let mut events = tracker.subscribe();

    tracker.start_tracking().await;
    provider.push(Ok(fix(1.0, 2.0, 100)));
    wait_for(&mut events, is_self_update).await;

    tracker.set_display_name("Alice").await;

    let me = tracker.self_location().await.unwrap();
    assert_eq!(me.name, "Alice");
    assert_eq!(me.latitude, 1.0);
    assert_eq!(me.longitude, 2.0);
    assert_eq!(me.timestamp, 100);
    assert_eq!(tracker.display_name().await, "Alice");

    let listed = tracker.locations().await;
    assert_eq!(listed.iter().find(|l| l.id == USER_ID).unwrap().name, "Alice");

    // Later fixes keep the chosen name
    provider.push(Ok(fix(1.1, 2.1, 200)));
    wait_for(&mut events, |e| {
        matches!(e, TrackerEvent::SelfLocationUpdated { location } if location.timestamp == 200)
    })
    .await;
    assert_eq!(tracker.self_location().await.unwrap().name, "Alice");
}

#[tokio::test]
async fn test_clearing_display_name_restores_fallback() {
    let provider = ManualGeolocation::default();
    let config = TrackerConfig {
        fallback_name: "Me".to_string(),
        ..TrackerConfig::default()
    };
    let tracker = LocationTracker::new(provider.clone(), config).unwrap();
    assert_eq!(tracker.config().fallback_name, "Me");
    let mut events = tracker.subscribe();

    tracker.set_display_name("Alice").await;
    tracker.start_tracking().await;
    provider.push(Ok(fix(1.0, 2.0, 100)));
    wait_for(&mut events, is_self_update).await;
    assert_eq!(tracker.self_location().await.unwrap().name, "Alice");

    tracker.set_display_name("").await;

    assert_eq!(tracker.display_name().await, "");
    let me = tracker.self_location().await.unwrap();
    assert_eq!(me.name, "Me");
    assert_eq!(me.timestamp, 100);
    let listed = tracker.locations().await;
    assert_eq!(listed.iter().find(|l| l.id == USER_ID).unwrap().name, "Me");
}

#[tokio::test]
async fn test_set_display_name_without_fix() {
    let tracker = LocationTracker::new(UnsupportedGeolocation, TrackerConfig::default()).unwrap();
    let mut events = tracker.subscribe();

    tracker.set_display_name("Bob").await;

    assert_eq!(tracker.display_name().await, "Bob");
    assert!(tracker.self_location().await.is_none());
    assert_eq!(
        events.try_recv().unwrap(),
        TrackerEvent::DisplayNameChanged {
            name: "Bob".to_string()
        }
    );
}

#[tokio::test]
async fn test_center_map_on() {
    let tracker = LocationTracker::new(UnsupportedGeolocation, TrackerConfig::default()).unwrap();

    assert!(tracker.map_focus().await.is_none());
    tracker.center_map_on(51.5, -0.12).await;

    let focus = tracker.map_focus().await.unwrap();
    assert_eq!(focus.latitude, 51.5);
    assert_eq!(focus.longitude, -0.12);
    assert!(!tracker.is_tracking().await);
}

#[tokio::test(start_paused = true)]
async fn test_active_locations_window() {
    let tracker = LocationTracker::new(UnsupportedGeolocation, TrackerConfig::default()).unwrap();
    tracker.initialize().await;

    assert_eq!(tracker.active_locations().await.len(), 3);

    // John was seeded 5 minutes before initialization
    let seeded_at = tracker.locations().await[0].timestamp + 5 * MINUTE_MS;

    // 55, 60 and 65 minutes old: only the first is strictly inside the hour
    let active = tracker.active_locations_at(seeded_at + 50 * MINUTE_MS).await;
    let names: Vec<&str> = active.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["John Doe"]);

    assert!(tracker
        .active_locations_at(seeded_at + 2 * 60 * MINUTE_MS)
        .await
        .is_empty());
}

#[tokio::test]
async fn test_shutdown_stops_background_work() {
    let provider = ManualGeolocation::default();
    let tracker = LocationTracker::new(provider.clone(), TrackerConfig::default()).unwrap();

    tracker.initialize().await;
    tracker.start_tracking().await;
    tracker.shutdown().await;

    assert!(!tracker.is_tracking().await);
    assert!(!tracker.is_simulating());
    assert_eq!(provider.open_watches(), 0);
    assert!(!tracker.stop_simulation());
}

#[tokio::test]
async fn test_dropping_tracker_clears_subscription() {
    let provider = ManualGeolocation::default();
    let tracker = LocationTracker::new(provider.clone(), TrackerConfig::default()).unwrap();

    tracker.start_tracking().await;
    assert_eq!(provider.open_watches(), 1);

    drop(tracker);
    assert_eq!(provider.open_watches(), 0);
}

#[test]
fn test_rejects_invalid_config() {
    let config = TrackerConfig {
        event_capacity: 0,
        ..TrackerConfig::default()
    };
    assert!(LocationTracker::new(UnsupportedGeolocation, config).is_err());
}

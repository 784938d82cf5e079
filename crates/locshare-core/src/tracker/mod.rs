//! Location tracker.
//!
//! Owns the known locations (self + peers) and mediates between three
//! asynchronous sources and a UI consumer:
//!
//! - a one-shot device position request made by [`LocationTracker::initialize`]
//! - a continuous position subscription opened by [`LocationTracker::start_tracking`]
//! - a timer that moves the demo peers around
//!
//! Each source runs as a tokio task and writes through the same
//! `RwLock<TrackerState>`, one whole update per lock, so replace-by-id
//! updates never interleave. Geolocation failures are logged and never
//! returned to the caller.

pub mod events;
pub mod feed;
pub mod state;

pub use events::TrackerEvent;
pub use feed::{demo_peers, PeerSimulator};
pub use state::TrackerState;

use std::sync::{Arc, Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::error::{ConfigError, GeolocationError};
use crate::geolocation::{GeolocationProvider, PositionWatch, WatchId};
use crate::types::{now_millis, Location, MapFocus, Position, PositionOptions};

/// State and channels shared with background tasks.
struct Shared {
    config: TrackerConfig,
    state: RwLock<TrackerState>,
    events: broadcast::Sender<TrackerEvent>,
}

impl Shared {
    fn emit(&self, event: TrackerEvent) {
        // No receivers is fine; the UI may not be listening yet.
        let _ = self.events.send(event);
    }

    fn self_name(&self, display_name: &str) -> String {
        if display_name.is_empty() {
            self.config.fallback_name.clone()
        } else {
            display_name.to_string()
        }
    }

    /// Store a device fix. With `publish` it also goes into the collection.
    async fn apply_fix(&self, position: Position, publish: bool) {
        let (location, locations) = {
            let mut state = self.state.write().await;
            let location = position.into_self_location(self.self_name(&state.display_name));

            if publish {
                state.record_self(location.clone());
                (location, Some(state.locations.clone()))
            } else {
                state.self_location = Some(location.clone());
                (location, None)
            }
        };

        debug!(
            lat = location.latitude,
            lon = location.longitude,
            accuracy = ?location.accuracy,
            "device location updated"
        );

        self.emit(TrackerEvent::SelfLocationUpdated { location });
        if let Some(locations) = locations {
            self.emit(TrackerEvent::LocationsUpdated { locations });
        }
    }
}

/// Background tasks owned by the tracker.
#[derive(Default)]
struct TaskSet {
    initialized: bool,
    rng: Option<StdRng>,
    one_shot: Option<JoinHandle<()>>,
    feed: Option<JoinHandle<()>>,
    pump: Option<JoinHandle<()>>,
    /// Mirrors `TrackerState::subscription` for teardown without the state lock.
    watch: Option<WatchId>,
}

impl TaskSet {
    fn abort_all(&mut self) {
        for handle in [self.one_shot.take(), self.feed.take(), self.pump.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }
    }
}

struct Inner {
    provider: Arc<dyn GeolocationProvider>,
    shared: Arc<Shared>,
    tasks: Mutex<TaskSet>,
}

impl Inner {
    fn tasks(&self) -> MutexGuard<'_, TaskSet> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let mut tasks = self.tasks();
        tasks.abort_all();

        if let Some(id) = tasks.watch.take() {
            self.provider.clear_watch(id);
        }
    }
}

/// The location state container handed to a UI layer.
///
/// Cloning is cheap and every clone refers to the same state. All
/// background work stops when the last clone is dropped, or earlier with
/// [`shutdown`](Self::shutdown). Must be used inside a tokio runtime.
#[derive(Clone)]
pub struct LocationTracker {
    inner: Arc<Inner>,
}

impl LocationTracker {
    /// Create a tracker over the given geolocation capability.
    pub fn new<P: GeolocationProvider>(
        provider: P,
        config: TrackerConfig,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(provider, config, StdRng::from_os_rng())
    }

    /// Create a tracker whose simulated feed uses a fixed random seed.
    pub fn with_seed<P: GeolocationProvider>(
        provider: P,
        config: TrackerConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(provider, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng<P: GeolocationProvider>(
        provider: P,
        config: TrackerConfig,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let (events, _) = broadcast::channel(config.event_capacity);

        Ok(Self {
            inner: Arc::new(Inner {
                provider: Arc::new(provider),
                shared: Arc::new(Shared {
                    config,
                    state: RwLock::new(TrackerState::default()),
                    events,
                }),
                tasks: Mutex::new(TaskSet {
                    rng: Some(rng),
                    ..TaskSet::default()
                }),
            }),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.inner.shared.config
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.inner.shared.events.subscribe()
    }

    // ==================== Actions ====================

    /// Seed the demo peers, request a one-shot device fix and start the
    /// simulated peer feed.
    ///
    /// Only the first call has any effect.
    pub async fn initialize(&self) {
        let rng = {
            let mut tasks = self.inner.tasks();
            if tasks.initialized {
                warn!("tracker already initialized, ignoring");
                return;
            }
            tasks.initialized = true;
            tasks.rng.take()
        };

        let shared = &self.inner.shared;
        let peers = demo_peers(now_millis());

        let locations = {
            let mut state = shared.state.write().await;
            state.locations = peers.clone();
            state.locations.clone()
        };
        info!(peers = peers.len(), "tracker initialized with demo peers");
        shared.emit(TrackerEvent::LocationsUpdated { locations });

        let one_shot = self.spawn_one_shot();

        let simulator = PeerSimulator::new(peers, shared.config.jitter_degrees);
        let rng = rng.unwrap_or_else(StdRng::from_os_rng);
        let feed = tokio::spawn(run_feed(shared.clone(), simulator, rng));

        let mut tasks = self.inner.tasks();
        tasks.one_shot = Some(one_shot);
        tasks.feed = Some(feed);
    }

    fn spawn_one_shot(&self) -> JoinHandle<()> {
        let request = self
            .inner
            .provider
            .current_position(PositionOptions::default());
        let shared = self.inner.shared.clone();

        tokio::spawn(async move {
            match request.await {
                Ok(position) => shared.apply_fix(position, false).await,
                Err(GeolocationError::Unsupported) => {
                    warn!("geolocation is not supported, device location unavailable");
                }
                Err(e) => {
                    warn!(code = ?e.code(), "error getting device location: {}", e);
                }
            }
        })
    }

    /// Open a continuous high-accuracy subscription. No-op if already tracking.
    pub async fn start_tracking(&self) {
        let shared = &self.inner.shared;
        let mut state = shared.state.write().await;

        if state.tracking {
            debug!("already tracking");
            return;
        }

        let watch = match self.inner.provider.watch_position(shared.config.tracking) {
            Ok(watch) => watch,
            Err(e) => {
                warn!(code = ?e.code(), "could not start location tracking: {}", e);
                return;
            }
        };

        state.tracking = true;
        state.subscription = Some(watch.id);
        info!(watch = watch.id.0, "location tracking started");

        let id = watch.id;
        let pump = tokio::spawn(run_pump(shared.clone(), watch));
        {
            let mut tasks = self.inner.tasks();
            tasks.watch = Some(id);
            if let Some(previous) = tasks.pump.replace(pump) {
                previous.abort();
            }
        }
        drop(state);

        shared.emit(TrackerEvent::TrackingChanged { tracking: true });
    }

    /// Cancel the continuous subscription. No-op if not tracking.
    pub async fn stop_tracking(&self) {
        let shared = &self.inner.shared;
        let mut state = shared.state.write().await;

        if !state.tracking {
            return;
        }

        state.tracking = false;
        if let Some(id) = state.subscription.take() {
            self.inner.provider.clear_watch(id);
            info!(watch = id.0, "location tracking stopped");
        }

        {
            let mut tasks = self.inner.tasks();
            tasks.watch = None;
            if let Some(pump) = tasks.pump.take() {
                pump.abort();
            }
        }
        drop(state);

        shared.emit(TrackerEvent::TrackingChanged { tracking: false });
    }

    /// Set the local device's label, renaming the current fix in place.
    pub async fn set_display_name(&self, name: impl Into<String>) {
        let name = name.into();
        let shared = &self.inner.shared;

        let renamed = {
            let mut state = shared.state.write().await;
            state.display_name = name.clone();
            let label = shared.self_name(&name);
            if state.rename_self(&label) {
                state.self_location.clone()
            } else {
                None
            }
        };

        shared.emit(TrackerEvent::DisplayNameChanged { name });
        if let Some(location) = renamed {
            shared.emit(TrackerEvent::SelfLocationUpdated { location });
        }
    }

    /// Ask the UI to center its map on a point.
    pub async fn center_map_on(&self, latitude: f64, longitude: f64) {
        let focus = MapFocus {
            latitude,
            longitude,
        };
        self.inner.shared.state.write().await.map_focus = Some(focus);
        self.inner.shared.emit(TrackerEvent::MapFocusChanged { focus });
    }

    /// Stop the simulated peer feed. Returns `false` if it was not running.
    pub fn stop_simulation(&self) -> bool {
        match self.inner.tasks().feed.take() {
            Some(feed) => {
                feed.abort();
                info!("peer simulation stopped");
                true
            }
            None => false,
        }
    }

    /// Stop tracking, the peer feed and any pending one-shot request.
    pub async fn shutdown(&self) {
        self.stop_tracking().await;
        self.stop_simulation();

        if let Some(one_shot) = self.inner.tasks().one_shot.take() {
            one_shot.abort();
        }
    }

    // ==================== Queries ====================

    pub async fn locations(&self) -> Vec<Location> {
        self.inner.shared.state.read().await.locations.clone()
    }

    pub async fn self_location(&self) -> Option<Location> {
        self.inner.shared.state.read().await.self_location.clone()
    }

    pub async fn display_name(&self) -> String {
        self.inner.shared.state.read().await.display_name.clone()
    }

    pub async fn is_tracking(&self) -> bool {
        self.inner.shared.state.read().await.tracking
    }

    pub async fn map_focus(&self) -> Option<MapFocus> {
        self.inner.shared.state.read().await.map_focus
    }

    /// Locations reported within the active window before now.
    pub async fn active_locations(&self) -> Vec<Location> {
        self.active_locations_at(now_millis()).await
    }

    /// Locations reported within the active window before `now`.
    pub async fn active_locations_at(&self, now: i64) -> Vec<Location> {
        let window = self.active_window_ms();
        self.inner
            .shared
            .state
            .read()
            .await
            .active_locations_at(now, window)
    }

    /// A copy of the whole state.
    pub async fn snapshot(&self) -> TrackerState {
        self.inner.shared.state.read().await.clone()
    }

    pub fn is_simulating(&self) -> bool {
        self.inner
            .tasks()
            .feed
            .as_ref()
            .is_some_and(|feed| !feed.is_finished())
    }

    fn active_window_ms(&self) -> i64 {
        // validate() guarantees the window fits
        i64::try_from(self.inner.shared.config.active_window_ms).unwrap_or(i64::MAX)
    }
}

/// Move one demo peer every simulation interval.
async fn run_feed(shared: Arc<Shared>, simulator: PeerSimulator, mut rng: StdRng) {
    let period = shared.config.simulation_interval();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let update = {
            let mut state = shared.state.write().await;
            simulator
                .tick(&mut state, now_millis(), &mut rng)
                .map(|moved| (moved, state.locations.clone()))
        };

        if let Some((moved, locations)) = update {
            debug!(peer = %moved.id, lat = moved.latitude, lon = moved.longitude, "simulated peer moved");
            shared.emit(TrackerEvent::LocationsUpdated { locations });
        }
    }
}

/// Apply reports from a position subscription until it closes.
async fn run_pump(shared: Arc<Shared>, mut watch: PositionWatch) {
    let id: WatchId = watch.id;

    while let Some(report) = watch.updates.recv().await {
        match report {
            Ok(position) => {
                if shared.state.read().await.subscription != Some(id) {
                    break;
                }
                shared.apply_fix(position, true).await;
            }
            Err(e) => {
                warn!(watch = id.0, code = ?e.code(), "error tracking location: {}", e);
            }
        }
    }

    debug!(watch = id.0, "position subscription closed");
}

//! In-process geolocation providers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{GeolocationProvider, PositionResult, PositionWatch, WatchId};
use crate::error::GeolocationError;
use crate::types::{now_millis, Position, PositionOptions};

/// Provider for platforms without any location support.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedGeolocation;

impl GeolocationProvider for UnsupportedGeolocation {
    fn current_position(&self, _options: PositionOptions) -> BoxFuture<'static, PositionResult> {
        future::ready(Err(GeolocationError::Unsupported)).boxed()
    }

    fn watch_position(&self, _options: PositionOptions) -> Result<PositionWatch, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }

    fn clear_watch(&self, _id: WatchId) {}
}

/// Default time between fixes on a simulated subscription
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Default max drift per fix, in degrees
pub const DEFAULT_STEP_DEGREES: f64 = 0.0002;

/// Accuracy reported with high-accuracy fixes, in meters
const HIGH_ACCURACY_METERS: f64 = 5.0;

/// Accuracy reported otherwise, in meters
const COARSE_ACCURACY_METERS: f64 = 50.0;

struct SimulatorInner {
    latitude: f64,
    longitude: f64,
    rng: StdRng,
    next_watch: u64,
    watches: HashMap<WatchId, JoinHandle<()>>,
}

impl SimulatorInner {
    fn step(&mut self, max_step: f64) {
        self.latitude += self.rng.random_range(-max_step..=max_step);
        self.longitude += self.rng.random_range(-max_step..=max_step);
    }

    fn fix(&self, options: &PositionOptions) -> Position {
        Position {
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy: if options.high_accuracy {
                HIGH_ACCURACY_METERS
            } else {
                COARSE_ACCURACY_METERS
            },
            timestamp: now_millis(),
        }
    }
}

/// A device that wanders around a starting point.
///
/// Every subscription reports immediately, then once per report interval,
/// moving by a bounded random step before each subsequent fix. Subscriptions
/// run as tokio tasks, so `watch_position` must be called inside a runtime.
#[derive(Clone)]
pub struct SimulatedGeolocation {
    inner: Arc<Mutex<SimulatorInner>>,
    interval: Duration,
    step_degrees: f64,
}

impl SimulatedGeolocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::with_rng(latitude, longitude, StdRng::from_os_rng())
    }

    /// Create a simulator with a deterministic random sequence.
    pub fn with_seed(latitude: f64, longitude: f64, seed: u64) -> Self {
        Self::with_rng(latitude, longitude, StdRng::seed_from_u64(seed))
    }

    fn with_rng(latitude: f64, longitude: f64, rng: StdRng) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimulatorInner {
                latitude,
                longitude,
                rng,
                next_watch: 1,
                watches: HashMap::new(),
            })),
            interval: DEFAULT_REPORT_INTERVAL,
            step_degrees: DEFAULT_STEP_DEGREES,
        }
    }

    /// Set the time between fixes on a subscription.
    pub fn report_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the max drift per fix. Zero keeps the device still.
    pub fn step_degrees(mut self, step: f64) -> Self {
        self.step_degrees = step.abs();
        self
    }

    /// Number of subscriptions currently open.
    pub fn active_watches(&self) -> usize {
        self.lock().watches.len()
    }

    fn lock(&self) -> MutexGuard<'_, SimulatorInner> {
        // The state stays consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl GeolocationProvider for SimulatedGeolocation {
    fn current_position(&self, options: PositionOptions) -> BoxFuture<'static, PositionResult> {
        let fix = self.lock().fix(&options);
        future::ready(Ok(fix)).boxed()
    }

    fn watch_position(&self, options: PositionOptions) -> Result<PositionWatch, GeolocationError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = self.inner.clone();
        let interval = self.interval;
        let step = self.step_degrees;

        let mut guard = self.lock();
        let id = WatchId(guard.next_watch);
        guard.next_watch += 1;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut first = true;

            loop {
                ticker.tick().await;

                let fix = {
                    let mut sim = inner.lock().unwrap_or_else(|p| p.into_inner());
                    if !first {
                        sim.step(step);
                    }
                    sim.fix(&options)
                };
                first = false;

                if tx.send(Ok(fix)).is_err() {
                    break;
                }
            }
        });

        guard.watches.insert(id, handle);
        tracing::debug!(watch = id.0, ?options, "simulated position watch opened");

        Ok(PositionWatch { id, updates: rx })
    }

    fn clear_watch(&self, id: WatchId) {
        if let Some(handle) = self.lock().watches.remove(&id) {
            handle.abort();
            tracing::debug!(watch = id.0, "simulated position watch cleared");
        }
    }
}

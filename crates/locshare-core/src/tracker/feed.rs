//! Demo peers and the simulated peer feed.
//!
//! There is no peer transport. Instead a timer moves one of the demo peers
//! a little on every tick, which is enough to watch markers move on a map.

use rand::Rng;

use super::state::TrackerState;
use crate::config::MAX_JITTER_DEGREES;
use crate::types::Location;

const MINUTE_MS: i64 = 60_000;

/// The fixed demo peer set, stamped relative to `now`.
pub fn demo_peers(now: i64) -> Vec<Location> {
    vec![
        Location::peer("1", "John Doe", 40.7128, -74.0060, now - 5 * MINUTE_MS),
        Location::peer("2", "Jane Smith", 34.0522, -118.2437, now - 10 * MINUTE_MS),
        Location::peer("3", "Bob Johnson", 51.5074, -0.1278, now - 15 * MINUTE_MS),
    ]
}

/// Moves simulated peers around.
#[derive(Debug, Clone)]
pub struct PeerSimulator {
    peers: Vec<Location>,
    jitter_degrees: f64,
}

impl PeerSimulator {
    /// Jitter is clamped to `0..=MAX_JITTER_DEGREES`; NaN becomes the maximum.
    pub fn new(peers: Vec<Location>, jitter_degrees: f64) -> Self {
        Self {
            peers,
            jitter_degrees: jitter_degrees.abs().min(MAX_JITTER_DEGREES),
        }
    }

    /// Move one randomly chosen peer and publish it into `state`.
    ///
    /// The peer starts from its tracked position, or its seed position if it
    /// is not tracked. Returns the published location.
    pub fn tick<R: Rng>(
        &self,
        state: &mut TrackerState,
        now: i64,
        rng: &mut R,
    ) -> Option<Location> {
        if self.peers.is_empty() {
            return None;
        }

        let seed = &self.peers[rng.random_range(0..self.peers.len())];
        let mut moved = state.get(&seed.id).unwrap_or(seed).clone();

        let jitter = self.jitter_degrees;
        moved.latitude += rng.random_range(-jitter..=jitter);
        moved.longitude += rng.random_range(-jitter..=jitter);
        moved.timestamp = now;

        state.upsert(moved.clone());
        Some(moved)
    }
}

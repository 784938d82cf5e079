//! Device geolocation capability.
//!
//! A platform exposes three operations: a one-shot position request, a
//! continuous subscription, and cancellation of that subscription. The
//! tracker only talks to this trait, so a browser bridge, a mobile binding
//! or the bundled simulator can be plugged in.

pub mod simulated;

pub use simulated::{SimulatedGeolocation, UnsupportedGeolocation};

use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::error::GeolocationError;
use crate::types::{Position, PositionOptions};

/// Outcome of a single position acquisition.
pub type PositionResult = Result<Position, GeolocationError>;

/// Handle to an open position subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(pub u64);

/// An open subscription: its handle plus the stream of reports.
///
/// Errors arrive on the same channel as fixes. The subscription stays open
/// after an error; it ends when the provider drops the sender.
#[derive(Debug)]
pub struct PositionWatch {
    pub id: WatchId,
    pub updates: mpsc::UnboundedReceiver<PositionResult>,
}

/// Platform geolocation capability.
pub trait GeolocationProvider: Send + Sync + 'static {
    /// Request a single position.
    fn current_position(&self, options: PositionOptions) -> BoxFuture<'static, PositionResult>;

    /// Open a continuous subscription.
    ///
    /// Fails immediately only when no subscription can be opened at all
    /// (for example when geolocation is unsupported).
    fn watch_position(&self, options: PositionOptions) -> Result<PositionWatch, GeolocationError>;

    /// Cancel a subscription. Unknown ids are ignored.
    fn clear_watch(&self, id: WatchId);
}

//! Command implementations.

pub mod config;
pub mod session;
pub mod snapshot;
pub mod watch;

pub use config::{load_config, run_config};
pub use snapshot::run_snapshot;
pub use watch::run_watch;

//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// locshare - watch your own and your peers' locations from the terminal
#[derive(Parser, Debug)]
#[command(name = "locshare")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: platform config dir)
    #[arg(long, global = true, env = "LOCSHARE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream location changes as they happen
    Watch(WatchArgs),

    /// Print the known locations once
    Snapshot(SnapshotArgs),

    /// Tracker configuration
    Config(ConfigArgs),
}

// ==================== Session ====================

/// Options shared by every command that runs a tracker.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Simulated device latitude
    #[arg(long, default_value_t = 40.7580, allow_negative_numbers = true)]
    pub lat: f64,

    /// Simulated device longitude
    #[arg(long, default_value_t = -73.9855, allow_negative_numbers = true)]
    pub lon: f64,

    /// Display name for this device
    #[arg(short, long)]
    pub name: Option<String>,

    /// Continuously track the device position
    #[arg(short, long)]
    pub track: bool,

    /// Behave as a platform without geolocation support
    #[arg(long, conflicts_with = "track")]
    pub no_geolocation: bool,

    /// Seed for the simulated movement (reproducible runs)
    #[arg(long)]
    pub seed: Option<u64>,
}

// ==================== Watch ====================

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Stop after this many seconds (0 = until Ctrl+C)
    #[arg(short, long, default_value = "0")]
    pub duration: u64,
}

// ==================== Snapshot ====================

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Seconds to let the tracker run before printing
    #[arg(short, long, default_value = "0")]
    pub wait: u64,

    /// Include locations outside the active window
    #[arg(long)]
    pub all: bool,

    /// Only show names matching this pattern (* and ? wildcards)
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Center the map on the location with this id
    #[arg(long)]
    pub focus: Option<String>,
}

// ==================== Config ====================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a default config file
    Init(ConfigInitArgs),

    /// Print the config file path
    Path,
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

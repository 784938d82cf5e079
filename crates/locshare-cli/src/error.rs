//! Error types for the locshare CLI.
//!
//! CliError wraps CoreError from the shared library and adds CLI-specific variants.

use locshare_core::error::CoreError;
use thiserror::Error;

pub use locshare_core::error::ConfigError;

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_ARGS: i32 = 4;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No locations found")]
    NoLocationsFound,

    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(CoreError::Config(ConfigError::Invalid { .. })) => {
                exit_codes::INVALID_ARGS
            }
            CliError::InvalidArgument(_) => exit_codes::INVALID_ARGS,
            CliError::Core(_)
            | CliError::Io(_)
            | CliError::NoLocationsFound
            | CliError::Other(_) => exit_codes::GENERAL_ERROR,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Core(CoreError::Config(e))
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

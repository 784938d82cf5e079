//! Config command implementation.

use std::path::{Path, PathBuf};

use locshare_core::config::default_config_path;
use locshare_core::TrackerConfig;

use crate::cli::{ConfigArgs, ConfigCommands, ConfigInitArgs};
use crate::error::CliError;
use crate::output::get_formatter;

/// Resolve the config path: explicit flag/env first, then the platform default.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(default_config_path)
}

/// Load the tracker config, using defaults when no file exists.
pub async fn load_config(path: Option<&Path>) -> Result<TrackerConfig, CliError> {
    match path {
        Some(path) => Ok(TrackerConfig::load_or_default(path).await?),
        None => {
            tracing::debug!("no config directory available, using defaults");
            Ok(TrackerConfig::default())
        }
    }
}

/// Run the config command
pub async fn run_config(
    args: ConfigArgs,
    path: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let formatter = get_formatter(json);

    match args.command {
        ConfigCommands::Show => {
            let config = load_config(path.as_deref()).await?;
            println!("{}", formatter.format_config(&config));
        }
        ConfigCommands::Init(init) => {
            let path = require_path(path)?;
            init_config(&path, &init).await?;
            println!(
                "{}",
                formatter.format_message(&format!("Wrote default config to {}", path.display()))
            );
        }
        ConfigCommands::Path => {
            let path = require_path(path)?;
            println!("{}", formatter.format_message(&path.display().to_string()));
        }
    }

    Ok(())
}

fn require_path(path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    path.ok_or_else(|| {
        CliError::Other("Could not determine a config directory; pass --config".to_string())
    })
}

async fn init_config(path: &Path, args: &ConfigInitArgs) -> Result<(), CliError> {
    if !args.force && tokio::fs::try_exists(path).await? {
        return Err(CliError::InvalidArgument(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    TrackerConfig::default().save(path).await?;
    Ok(())
}

//! Snapshot command implementation.

use std::time::Duration;

use locshare_core::types::now_millis;
use locshare_core::{Location, TrackerConfig};
use regex::Regex;

use super::session::start_session;
use crate::cli::SnapshotArgs;
use crate::error::CliError;
use crate::output::get_formatter;

/// Pause before reading state when no wait was requested
const SETTLE_TIME: Duration = Duration::from_millis(200);

/// Run the snapshot command
pub async fn run_snapshot(
    args: SnapshotArgs,
    config: TrackerConfig,
    json: bool,
) -> Result<(), CliError> {
    let formatter = get_formatter(json);
    let name_pattern = args.filter.as_deref().map(glob_to_regex).transpose()?;

    let session = start_session(&args.session, config).await?;
    let tracker = session.tracker;

    if args.wait > 0 {
        if !json {
            println!("Collecting locations for {} seconds...", args.wait);
        }
        tokio::time::sleep(Duration::from_secs(args.wait)).await;
    } else {
        // Give the first position reports time to land
        tokio::time::sleep(SETTLE_TIME).await;
    }

    if let Some(id) = &args.focus {
        let target = tracker
            .locations()
            .await
            .into_iter()
            .find(|l| &l.id == id)
            .ok_or_else(|| CliError::InvalidArgument(format!("Unknown location id: {}", id)))?;
        tracker.center_map_on(target.latitude, target.longitude).await;
    }

    let now = now_millis();
    let locations = if args.all {
        tracker.locations().await
    } else {
        tracker.active_locations_at(now).await
    };
    let locations = filter_by_name(locations, name_pattern.as_ref());
    let focus = tracker.map_focus().await;

    tracker.shutdown().await;

    println!(
        "{}",
        formatter.format_locations(&locations, focus.as_ref(), now)
    );

    if locations.is_empty() {
        return Err(CliError::NoLocationsFound);
    }

    Ok(())
}

/// Compile a `*`/`?` wildcard pattern into an anchored, case-insensitive regex.
pub fn glob_to_regex(pattern: &str) -> Result<Regex, CliError> {
    let escaped = regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");

    Regex::new(&format!("(?i)^{}$", escaped))
        .map_err(|e| CliError::InvalidArgument(format!("Invalid filter '{}': {}", pattern, e)))
}

fn filter_by_name(locations: Vec<Location>, pattern: Option<&Regex>) -> Vec<Location> {
    match pattern {
        Some(re) => locations
            .into_iter()
            .filter(|l| re.is_match(&l.name))
            .collect(),
        None => locations,
    }
}

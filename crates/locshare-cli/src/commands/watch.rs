//! Watch command implementation.

use std::io::{self, Write};
use std::time::Duration;

use colored::*;
use locshare_core::types::now_millis;
use tokio::sync::broadcast::error::RecvError;

use super::session::start_session;
use crate::cli::WatchArgs;
use crate::error::CliError;
use crate::output::get_formatter;

/// Run the watch command
pub async fn run_watch(
    args: WatchArgs,
    config: locshare_core::TrackerConfig,
    json: bool,
) -> Result<(), CliError> {
    let formatter = get_formatter(json);
    let session = start_session(&args.session, config).await?;
    let tracker = session.tracker;
    let mut events = session.events;

    if !json {
        if args.duration > 0 {
            println!("Watching locations for {} seconds...\n", args.duration);
        } else {
            println!("{}", "Watching locations (press Ctrl+C to stop)...".bold());
            println!();
        }
    }

    let deadline = async {
        if args.duration > 0 {
            tokio::time::sleep(Duration::from_secs(args.duration)).await;
        } else {
            std::future::pending::<()>().await;
        }
    };
    tokio::pin!(deadline);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    println!("{}", formatter.format_event(&event, now_millis()));
                    io::stdout().flush().ok();
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "output fell behind, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut deadline => break,
            _ = &mut ctrl_c => break,
        }
    }

    tracker.shutdown().await;

    if !json {
        let active = tracker.active_locations().await;
        let window_minutes = tracker.config().active_window_ms / 60_000;
        println!();
        println!(
            "{} location(s) active in the last {} min at exit",
            active.len(),
            window_minutes
        );
    }

    Ok(())
}

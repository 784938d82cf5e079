//! locshare CLI - terminal front end for the location tracker.
//!
//! Runs a tracker against a simulated device position and the simulated
//! peer feed, printing locations and change events as tables or JSON.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing::Level;

use cli::{Cli, Commands};
use commands::config::resolve_config_path;
use error::{exit_codes, CliError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Log to stderr so stdout stays clean for tables and JSON.
fn init_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_max_level(log_level(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn log_level(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = resolve_config_path(cli.config);

    match cli.command {
        Commands::Watch(args) => {
            let config = commands::load_config(config_path.as_deref()).await?;
            commands::run_watch(args, config, cli.json).await
        }
        Commands::Snapshot(args) => {
            let config = commands::load_config(config_path.as_deref()).await?;
            commands::run_snapshot(args, config, cli.json).await
        }
        Commands::Config(args) => commands::run_config(args, config_path, cli.json).await,
    }
}

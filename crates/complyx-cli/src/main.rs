//! Complyx CLI entry point.
//!
//! Binary name: `complyx`
//!
//! Parses CLI arguments, initializes the database and stores, then
//! dispatches to the appropriate command handler.

mod cli;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,complyx=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Initialize application state (DB, stores, backend client)
    let mut state = AppState::init().await?;
    tracing::debug!(data_dir = %state.data_dir.display(), "Application state initialized");

    match cli.command {
        Commands::Session { action } => {
            cli::session::run(&mut state, action, cli.json).await?;
        }
        Commands::Chat { action } => {
            cli::chat::run(&mut state, action, cli.json).await?;
        }
        Commands::Assessment { action } => {
            cli::assessment::run(&mut state, action, cli.json).await?;
        }
    }

    Ok(())
}

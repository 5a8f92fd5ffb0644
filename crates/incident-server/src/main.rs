//! # Incident Server
//!
//! Entry point for the incident tracker.
//!
//! ```text
//! incident-server [--config FILE] [--json-logs] serve
//! incident-server [--config FILE] seed [--count 200] [--users 8] [--days 90]
//! ```
//!
//! Logging honors `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use incident_server::{load_config, open_store, run_seed, run_server, SeedOptions};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "incident-server")]
#[command(about = "Incident tracking API server", version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,

    /// Delete all incidents and insert generated ones
    Seed {
        /// Number of incidents to create
        #[arg(long, default_value_t = 200)]
        count: u32,

        /// Number of distinct owners (user-1 .. user-N)
        #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..))]
        users: u32,

        /// Spread createdAt over this many past days
        #[arg(long, default_value_t = 90)]
        days: u32,
    },
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown..."),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    info!("===========================================");
    info!("  Incident Server v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let config = load_config(cli.config.as_deref())?;
    let store = open_store(&config.store).context("failed to open record store")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(config, store, shutdown_signal()).await?,
        Command::Seed { count, users, days } => {
            let options = SeedOptions { count, users, days };
            let seeded = run_seed(store.as_ref(), &options).await;
            store.close().await.context("failed to close record store")?;
            seeded?;
        }
    }

    info!("Incident server shutdown complete");
    Ok(())
}

//! # Incident Server Library
//!
//! Process wiring for the `incident-server` binary, exposed for testing.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file, then `INCIDENT_*` environment)
//! 2. Open the record store once
//! 3. Build the incident service and the HTTP front end
//! 4. Serve until the shutdown future resolves
//! 5. Close the store

pub mod config;
pub mod seed;
pub mod store;

pub use config::{apply_env_overrides, load_config, OverrideError};
pub use seed::{generate_incidents, reseed, SeedError, SeedOptions, SeedReport};
pub use store::open_store;

use anyhow::{Context, Result};
use chrono::Utc;
use incident_api::{ApiConfig, IncidentApiService};
use incident_core::{IncidentService, IncidentStore};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};

/// Serve the API over `store` until `shutdown` resolves. The store is closed
/// before returning, including when serving fails.
pub async fn run_server<F>(
    config: ApiConfig,
    store: Arc<dyn IncidentStore>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let service = IncidentService::new(Arc::clone(&store));
    let api = IncidentApiService::new(config, Arc::new(service))
        .context("failed to build HTTP service")?;

    let served = api.serve(shutdown).await;

    info!("[incidents] Closing record store");
    if let Err(e) = store.close().await {
        error!(error = %e, "[incidents] Failed to close record store");
    }

    served.context("HTTP server failed")
}

/// Reset `store` with generated incidents.
pub async fn run_seed(store: &dyn IncidentStore, options: &SeedOptions) -> Result<SeedReport> {
    info!(
        count = options.count,
        users = options.users,
        days = options.days,
        "[incidents] Seeding started"
    );
    let incidents = generate_incidents(options, &mut rand::thread_rng(), Utc::now())?;
    let report = reseed(store, incidents).await?;
    info!(
        removed = report.removed,
        inserted = report.inserted,
        "[incidents] Seeding completed"
    );
    Ok(report)
}

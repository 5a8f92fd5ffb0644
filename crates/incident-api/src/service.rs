//! Incident API service - owns the validated config and the router, and
//! runs the HTTP listener until shutdown.

use crate::domain::{ApiConfig, ServerError};
use crate::middleware::{identity_from_config, IdentityProvider};
use crate::router::build_router;
use axum::Router;
use incident_core::IncidentApi;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// HTTP front end for an [`IncidentApi`].
pub struct IncidentApiService {
    config: ApiConfig,
    router: Router,
}

impl IncidentApiService {
    /// Validate `config` and build the router around `api`.
    pub fn new(config: ApiConfig, api: Arc<dyn IncidentApi>) -> Result<Self, ServerError> {
        config.validate()?;
        let identity = identity_from_config(&config.identity)?;
        Ok(Self::with_identity(config, api, identity))
    }

    /// Build with an explicit identity provider (config identity section is ignored).
    pub fn with_identity(
        config: ApiConfig,
        api: Arc<dyn IncidentApi>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let router = build_router(&config, api, identity);
        Self { config, router }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Router clone, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.config.http.enabled {
            info!("HTTP server disabled; waiting for shutdown");
            shutdown.await;
            return Ok(());
        }

        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("{addr}: {e}")))?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already-bound listener until `shutdown` resolves.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener
            .local_addr()
            .map_err(|e| ServerError::Bind(e.to_string()))?;
        info!(addr = %local, "Starting HTTP server");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        info!("HTTP server stopped");
        Ok(())
    }
}

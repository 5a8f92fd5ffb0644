//! Router assembly.

use crate::domain::{ApiConfig, ApiError};
use crate::middleware::{
    create_cors_layer, IdentityLayer, IdentityProvider, TimeoutLayer, TracingLayer,
    ValidationLayer,
};
use crate::routes::{health, incidents, AppState};
use axum::{
    response::IntoResponse,
    routing::get,
    Router,
};
use incident_core::IncidentApi;
use std::sync::Arc;
use tower::ServiceBuilder;

/// Build the full router with its middleware stack.
pub fn build_router(
    config: &ApiConfig,
    api: Arc<dyn IncidentApi>,
    identity: Arc<dyn IdentityProvider>,
) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(create_cors_layer(&config.cors))
        .layer(TracingLayer::new())
        .layer(TimeoutLayer::new(config.timeouts.request))
        .layer(ValidationLayer::new(config.limits.clone()))
        .layer(IdentityLayer::new(identity));

    Router::new()
        .route(
            "/api/incidents",
            get(incidents::list_incidents).post(incidents::create_incident),
        )
        .route(
            "/api/incidents/:id",
            get(incidents::get_incident).patch(incidents::update_incident),
        )
        .route("/health", get(health::health_check))
        .fallback(route_not_found)
        .layer(middleware)
        .with_state(AppState::new(api))
}

async fn route_not_found() -> impl IntoResponse {
    ApiError::route_not_found()
}

use axum::{response::IntoResponse, Json};

/// Liveness check; never touches the store and needs no caller.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "incident-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

//! Incident handlers.
//!
//! Handlers are thin: resolve the caller from request extensions, decode the
//! transport shape, and delegate to [`IncidentApi`]. The caller check comes
//! first so an anonymous request never learns anything about its input.

use super::AppState;
use crate::domain::{ApiError, ApiResult};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use incident_core::{parse_incident_id, CallerId, Incident, IncidentPage, ListParams};
use serde_json::Value;

type Caller = Option<Extension<CallerId>>;

fn require(caller: &Caller) -> ApiResult<&CallerId> {
    caller
        .as_ref()
        .map(|Extension(caller)| caller)
        .ok_or_else(ApiError::unauthorized)
}

fn decode_json(body: &[u8]) -> ApiResult<Value> {
    serde_json::from_slice(body).map_err(|e| ApiError::malformed_body(e.to_string()))
}

/// `GET /api/incidents`
pub async fn list_incidents(
    State(state): State<AppState>,
    caller: Caller,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<IncidentPage>> {
    let caller = require(&caller)?;
    // Repeated keys are not an error; the first value is used.
    let Query(pairs) = query.map_err(|e| ApiError::malformed_query(e.body_text()))?;
    let params = ListParams::from_pairs(pairs);
    let page = state.incidents.list(Some(caller), &params).await?;
    Ok(Json(page))
}

/// `GET /api/incidents/:id`
pub async fn get_incident(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<Incident>> {
    let caller = require(&caller)?;
    let incident = state.incidents.get(Some(caller), &id).await?;
    Ok(Json(incident))
}

/// `POST /api/incidents`
pub async fn create_incident(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Incident>)> {
    let caller = require(&caller)?;
    let payload = decode_json(&body)?;
    let incident = state.incidents.create(Some(caller), &payload).await?;
    Ok((StatusCode::CREATED, Json(incident)))
}

/// `PATCH /api/incidents/:id`
pub async fn update_incident(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Incident>> {
    let caller = require(&caller)?;
    // A malformed id outranks a malformed body.
    parse_incident_id(&id)?;
    let payload = decode_json(&body)?;
    let incident = state.incidents.update(Some(caller), &id, &payload).await?;
    Ok(Json(incident))
}

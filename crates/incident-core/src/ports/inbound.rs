//! # Inbound Port - IncidentApi
//!
//! The operations a transport (HTTP today) drives. Every operation takes the
//! resolved caller, if any, and rejects with `Unauthorized` before touching
//! the store when it is missing.
//!
//! | Method | Success | Errors |
//! |--------|---------|--------|
//! | `list` | page of incidents | Unauthorized, InvalidInput, Internal |
//! | `get` | incident | Unauthorized, InvalidInput, NotFound, Internal |
//! | `create` | created incident | Unauthorized, InvalidInput, Internal |
//! | `update` | updated incident | Unauthorized, InvalidInput, NotFound, Internal |

use crate::domain::{CallerId, Incident, IncidentError, IncidentPage, ListParams};
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait IncidentApi: Send + Sync {
    /// Filter, sort and paginate incidents.
    async fn list(
        &self,
        caller: Option<&CallerId>,
        params: &ListParams,
    ) -> Result<IncidentPage, IncidentError>;

    /// Fetch one incident by identifier.
    async fn get(&self, caller: Option<&CallerId>, id: &str) -> Result<Incident, IncidentError>;

    /// Create an incident owned by `caller`.
    async fn create(
        &self,
        caller: Option<&CallerId>,
        payload: &Value,
    ) -> Result<Incident, IncidentError>;

    /// Apply a partial update to one incident.
    ///
    /// Checks run in order: identifier shape, payload shape, payload
    /// non-emptiness, record existence.
    async fn update(
        &self,
        caller: Option<&CallerId>,
        id: &str,
        payload: &Value,
    ) -> Result<Incident, IncidentError>;
}

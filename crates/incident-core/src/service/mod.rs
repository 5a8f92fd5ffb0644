//! # Incident Service
//!
//! Implements [`IncidentApi`] on top of an injected [`IncidentStore`].
//!
//! - `query`: list and get (read-only)
//! - `mutation`: create and partial update
//!
//! Every operation checks for a resolved caller before touching the store.

mod mutation;
mod query;

use crate::domain::{CallerId, Incident, IncidentError, IncidentPage, ListParams};
use crate::ports::inbound::IncidentApi;
use crate::ports::outbound::{IncidentStore, SystemTimeSource, TimeSource};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// The incident service.
///
/// Holds no per-request state; clones share the same store.
#[derive(Clone)]
pub struct IncidentService {
    pub(crate) store: Arc<dyn IncidentStore>,
    pub(crate) time_source: Arc<dyn TimeSource>,
}

impl IncidentService {
    pub fn new(store: Arc<dyn IncidentStore>) -> Self {
        Self::with_time_source(store, Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(store: Arc<dyn IncidentStore>, time_source: Arc<dyn TimeSource>) -> Self {
        Self { store, time_source }
    }

    pub fn store(&self) -> &Arc<dyn IncidentStore> {
        &self.store
    }
}

/// Resolve the caller or fail with `Unauthorized`.
pub(crate) fn require_caller(caller: Option<&CallerId>) -> Result<&CallerId, IncidentError> {
    caller.ok_or_else(|| {
        tracing::warn!("[incidents] rejected unauthenticated call");
        IncidentError::Unauthorized
    })
}

/// Log a store failure and surface it as `Internal`.
pub(crate) fn internal(operation: &'static str) -> impl Fn(crate::domain::StoreError) -> IncidentError {
    move |e| {
        tracing::error!(operation, error = %e, "[incidents] store failure");
        IncidentError::from(e)
    }
}

#[async_trait]
impl IncidentApi for IncidentService {
    async fn list(
        &self,
        caller: Option<&CallerId>,
        params: &ListParams,
    ) -> Result<IncidentPage, IncidentError> {
        self.list_incidents(caller, params).await
    }

    async fn get(&self, caller: Option<&CallerId>, id: &str) -> Result<Incident, IncidentError> {
        self.get_incident(caller, id).await
    }

    async fn create(
        &self,
        caller: Option<&CallerId>,
        payload: &Value,
    ) -> Result<Incident, IncidentError> {
        self.create_incident(caller, payload).await
    }

    async fn update(
        &self,
        caller: Option<&CallerId>,
        id: &str,
        payload: &Value,
    ) -> Result<Incident, IncidentError> {
        self.update_incident(caller, id, payload).await
    }
}

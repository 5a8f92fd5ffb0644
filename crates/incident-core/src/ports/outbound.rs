//! # Outbound Ports (Driven Ports)
//!
//! Collaborators the incident services depend on. The host process builds
//! one store instance at startup, shares it as `Arc<dyn IncidentStore>`, and
//! closes it at shutdown.
//!
//! Production: `SqliteIncidentStore` (adapters/sqlite.rs)
//! Testing / development: `InMemoryIncidentStore` (adapters/memory.rs)

use crate::domain::{FilterSpec, Incident, IncidentUpdate, SortSpec, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Record store for incidents.
///
/// Implementations provide exact-match filters on `severity`, `status` and
/// `service`, the case-insensitive `search` predicate on `title` OR
/// `summary`, single-field ordering and offset/limit windowing. A single
/// `update_by_id` is atomic; there is no cross-call transaction.
#[async_trait]
pub trait IncidentStore: Send + Sync {
    /// Insert a new record and return it as stored.
    async fn create(&self, incident: Incident) -> Result<Incident, StoreError>;

    /// Insert many records; returns how many were written.
    async fn create_many(&self, incidents: Vec<Incident>) -> Result<u64, StoreError> {
        let mut written = 0;
        for incident in incidents {
            self.create(incident).await?;
            written += 1;
        }
        Ok(written)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Incident>, StoreError>;

    /// Matching records in `sort` order, skipping `offset` and returning at
    /// most `limit`. An offset past the end yields an empty vector.
    async fn find_many(
        &self,
        filter: &FilterSpec,
        sort: SortSpec,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Incident>, StoreError>;

    /// Number of records matching `filter`, ignoring any window.
    async fn count(&self, filter: &FilterSpec) -> Result<u64, StoreError>;

    /// Apply the present fields of `update`. `None` when no record has `id`.
    async fn update_by_id(
        &self,
        id: Uuid,
        update: &IncidentUpdate,
    ) -> Result<Option<Incident>, StoreError>;

    /// Remove every record; returns how many were removed.
    ///
    /// Only the seed/reset command calls this.
    async fn delete_all(&self) -> Result<u64, StoreError>;

    /// Release underlying resources. Later calls fail with `StoreError::Closed`.
    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

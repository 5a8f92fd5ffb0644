//! Record store construction.

use incident_api::domain::StoreConfig;
use incident_api::StoreBackend;
use incident_core::{InMemoryIncidentStore, IncidentStore, SqliteIncidentStore, StoreError};
use std::sync::Arc;
use tracing::{info, warn};

/// Open the store selected by `config`. Called once at process start.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn IncidentStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            warn!("[incidents] Using in-memory store; records are lost on exit");
            Ok(Arc::new(InMemoryIncidentStore::new()))
        }
        StoreBackend::Sqlite => {
            let path = config.sqlite_path.as_ref().ok_or_else(|| {
                StoreError::Backend("store.sqlite_path is required for the sqlite backend".into())
            })?;
            let store = SqliteIncidentStore::open(path)?;
            info!(path = %path.display(), "[incidents] Opened SQLite store");
            Ok(Arc::new(store))
        }
    }
}

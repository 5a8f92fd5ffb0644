use crate::domain::{FilterSpec, Incident, IncidentUpdate, SortSpec, StoreError};
use crate::ports::outbound::IncidentStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// In-memory incident store.
///
/// Filtering and ordering run over a snapshot of the map, so a listing is
/// consistent with itself but the paired count may observe a later write.
#[derive(Default)]
pub struct InMemoryIncidentStore {
    records: RwLock<HashMap<Uuid, Incident>>,
    closed: AtomicBool,
}

impl InMemoryIncidentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `incidents`.
    pub fn with_incidents(incidents: impl IntoIterator<Item = Incident>) -> Self {
        let store = Self::new();
        {
            let mut records = store.records.write();
            for incident in incidents {
                records.insert(incident.id, incident);
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl IncidentStore for InMemoryIncidentStore {
    async fn create(&self, incident: Incident) -> Result<Incident, StoreError> {
        self.ensure_open()?;
        let mut records = self.records.write();
        if records.contains_key(&incident.id) {
            return Err(StoreError::Backend(format!(
                "duplicate incident id {}",
                incident.id
            )));
        }
        records.insert(incident.id, incident.clone());
        Ok(incident)
    }

    async fn create_many(&self, incidents: Vec<Incident>) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let mut records = self.records.write();
        // All-or-nothing: reject clashes with stored records and within the batch.
        let mut batch = HashSet::with_capacity(incidents.len());
        if let Some(dup) = incidents
            .iter()
            .find(|i| records.contains_key(&i.id) || !batch.insert(i.id))
        {
            return Err(StoreError::Backend(format!("duplicate incident id {}", dup.id)));
        }
        let written = incidents.len() as u64;
        for incident in incidents {
            records.insert(incident.id, incident);
        }
        Ok(written)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Incident>, StoreError> {
        self.ensure_open()?;
        Ok(self.records.read().get(&id).cloned())
    }

    async fn find_many(
        &self,
        filter: &FilterSpec,
        sort: SortSpec,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Incident>, StoreError> {
        self.ensure_open()?;
        let mut matching: Vec<Incident> = self
            .records
            .read()
            .values()
            .filter(|incident| filter.matches(incident))
            .cloned()
            .collect();
        matching.sort_by(|a, b| sort.compare(a, b));

        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(matching
            .into_iter()
            .skip(skip)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self, filter: &FilterSpec) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let total = self
            .records
            .read()
            .values()
            .filter(|incident| filter.matches(incident))
            .count();
        Ok(total as u64)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        update: &IncidentUpdate,
    ) -> Result<Option<Incident>, StoreError> {
        self.ensure_open()?;
        let mut records = self.records.write();
        Ok(records.get_mut(&id).map(|incident| {
            incident.apply(update);
            incident.clone()
        }))
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let mut records = self.records.write();
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

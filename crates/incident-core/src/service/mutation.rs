//! Write path: creation and partial update.

use super::{internal, require_caller, IncidentService};
use crate::domain::{
    parse_incident_id, parse_incident_update, parse_new_incident, CallerId, Incident,
    IncidentError,
};
use chrono::SubsecRound;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

impl IncidentService {
    /// Create an incident owned by the caller.
    ///
    /// Timestamps are truncated to microseconds, the finest precision every
    /// store keeps.
    pub async fn create_incident(
        &self,
        caller: Option<&CallerId>,
        payload: &Value,
    ) -> Result<Incident, IncidentError> {
        let owner = require_caller(caller)?;
        let new = parse_new_incident(payload)?;
        let incident = Incident::create(
            new,
            owner,
            Uuid::new_v4(),
            self.time_source.now().trunc_subsecs(6),
        );

        let created = self
            .store
            .create(incident)
            .await
            .map_err(internal("create"))?;
        info!(
            id = %created.id,
            owner = %owner,
            severity = %created.severity,
            "[incidents] created"
        );
        Ok(created)
    }

    /// Apply a partial update.
    ///
    /// Checks run in a fixed order and the first failure wins: identifier,
    /// payload shape, payload non-emptiness, then existence.
    pub async fn update_incident(
        &self,
        caller: Option<&CallerId>,
        id: &str,
        payload: &Value,
    ) -> Result<Incident, IncidentError> {
        let caller = require_caller(caller)?;
        let id = parse_incident_id(id)?;
        let update = parse_incident_update(payload)?;
        if update.is_empty() {
            return Err(IncidentError::no_fields());
        }

        if self
            .store
            .find_by_id(id)
            .await
            .map_err(internal("update"))?
            .is_none()
        {
            return Err(IncidentError::NotFound);
        }

        // The record can vanish between the lookup and the write.
        let updated = self
            .store
            .update_by_id(id, &update)
            .await
            .map_err(internal("update"))?
            .ok_or(IncidentError::NotFound)?;
        info!(
            %id,
            by = %caller,
            severity = ?update.severity,
            status = ?update.status,
            summary_changed = update.summary.is_some(),
            "[incidents] updated"
        );
        Ok(updated)
    }
}

//! Fixture builders shared by unit tests and the workspace test suite.

use crate::domain::{Incident, Severity, Status};
use crate::ports::outbound::TimeSource;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

/// Builder for stored incidents with sensible defaults.
#[derive(Clone, Debug)]
pub struct IncidentBuilder {
    incident: Incident,
}

impl Default for IncidentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IncidentBuilder {
    pub fn new() -> Self {
        Self {
            incident: Incident {
                id: Uuid::new_v4(),
                title: "Elevated error rate".to_string(),
                service: "API Gateway".to_string(),
                severity: Severity::Sev3,
                status: Status::Open,
                summary: Some("Investigating".to_string()),
                owner_id: "user-1".to_string(),
                created_at: Utc::now().trunc_subsecs(6),
            },
        }
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.incident.id = id;
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.incident.title = title.to_string();
        self
    }

    pub fn service(mut self, service: &str) -> Self {
        self.incident.service = service.to_string();
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.incident.severity = severity;
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.incident.status = status;
        self
    }

    pub fn summary(mut self, summary: Option<&str>) -> Self {
        self.incident.summary = summary.map(str::to_string);
        self
    }

    pub fn owner(mut self, owner: &str) -> Self {
        self.incident.owner_id = owner.to_string();
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.incident.created_at = created_at.trunc_subsecs(6);
        self
    }

    pub fn created_minutes_ago(self, minutes: i64) -> Self {
        self.created_at(Utc::now() - Duration::minutes(minutes))
    }

    pub fn build(self) -> Incident {
        self.incident
    }
}

/// Manually driven clock.
pub struct FixedTimeSource {
    now: Mutex<DateTime<Utc>>,
}

impl FixedTimeSource {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now.trunc_subsecs(6)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

//! Core domain entities for incident tracking.
//!
//! An [`Incident`] is the only persisted entity. Its `severity` and `status`
//! are closed enumerations so that arbitrary text can never reach the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Urgency classification, SEV1 (highest) through SEV4 (lowest).
///
/// The derived `Ord` follows declaration order, so `Sev1 < Sev4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Sev1,
    Sev2,
    Sev3,
    Sev4,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 4] = [Self::Sev1, Self::Sev2, Self::Sev3, Self::Sev4];

    /// Wire literal (`"SEV1"` ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sev1 => "SEV1",
            Self::Sev2 => "SEV2",
            Self::Sev3 => "SEV3",
            Self::Sev4 => "SEV4",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sev| sev.as_str() == s)
            .ok_or_else(|| UnknownVariant::new(s, &["SEV1", "SEV2", "SEV3", "SEV4"]))
    }
}

/// Lifecycle state of an incident. Any state may move to any other.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    #[default]
    Open,
    Mitigated,
    Resolved,
}

impl Status {
    pub const ALL: [Status; 3] = [Self::Open, Self::Mitigated, Self::Resolved];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Mitigated => "MITIGATED",
            Self::Resolved => "RESOLVED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant::new(s, &["OPEN", "MITIGATED", "RESOLVED"]))
    }
}

/// A string that did not match any literal of a closed enumeration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid enum value. Expected {}, received '{received}'", expected_list(.expected))]
pub struct UnknownVariant {
    pub received: String,
    pub expected: &'static [&'static str],
}

impl UnknownVariant {
    pub fn new(received: impl Into<String>, expected: &'static [&'static str]) -> Self {
        Self {
            received: received.into(),
            expected,
        }
    }
}

fn expected_list(expected: &[&str]) -> String {
    expected
        .iter()
        .map(|literal| format!("'{literal}'"))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Identifier of an authenticated caller, as produced by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(String);

impl CallerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tracked operational issue.
///
/// `id`, `title`, `service`, `owner_id` and `created_at` never change after
/// creation; only [`IncidentUpdate`] fields are mutable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: Uuid,
    pub title: String,
    pub service: String,
    pub severity: Severity,
    pub status: Status,
    pub summary: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

impl Incident {
    /// Materialize a validated creation request. The owner always comes from
    /// the caller, never from the payload.
    pub fn create(new: NewIncident, owner: &CallerId, id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            service: new.service,
            severity: new.severity,
            status: new.status,
            summary: new.summary,
            owner_id: owner.as_str().to_string(),
            created_at,
        }
    }

    /// Overwrite exactly the fields present in `update`.
    pub fn apply(&mut self, update: &IncidentUpdate) {
        if let Some(severity) = update.severity {
            self.severity = severity;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(summary) = &update.summary {
            self.summary = summary.clone();
        }
    }
}

/// Validated creation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewIncident {
    pub title: String,
    pub service: String,
    pub severity: Severity,
    pub status: Status,
    pub summary: Option<String>,
}

/// Partial update of the mutable incident fields.
///
/// `summary` is doubly optional: the outer `Option` records whether the field
/// was sent at all, the inner one whether it was set or cleared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncidentUpdate {
    pub severity: Option<Severity>,
    pub status: Option<Status>,
    pub summary: Option<Option<String>>,
}

impl IncidentUpdate {
    /// True when no recognized field was provided.
    pub fn is_empty(&self) -> bool {
        self.severity.is_none() && self.status.is_none() && self.summary.is_none()
    }
}

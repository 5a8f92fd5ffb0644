//! Error taxonomy for incident operations.
//!
//! Every failure surfaced to a caller is one of four kinds:
//! `Unauthorized`, `InvalidInput`, `NotFound`, or `Internal`.

use serde::Serialize;
use std::collections::BTreeMap;

/// Per-field validation detail, flattened the way clients consume it.
///
/// `form_errors` hold problems with the input as a whole (wrong JSON type,
/// no fields supplied); `field_errors` map an input key to its messages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationDetails {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationDetails {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a named field.
    pub fn field(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.field_errors
            .entry(name.into())
            .or_default()
            .push(message.into());
    }

    /// Record a message about the input as a whole.
    pub fn form(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// `Ok(())` when nothing was recorded, otherwise the aggregate error.
    pub fn into_result(self, message: &str) -> Result<(), IncidentError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(IncidentError::InvalidInput {
                message: message.to_string(),
                details: self,
            })
        }
    }
}

/// Incident operation error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IncidentError {
    /// No resolved caller identity.
    #[error("Unauthorized")]
    Unauthorized,

    /// Shape, type, enum or range violation.
    #[error("{message}")]
    InvalidInput {
        message: String,
        details: ValidationDetails,
    },

    /// Well-formed identifier with no matching record.
    #[error("Incident not found")]
    NotFound,

    /// Unexpected collaborator failure. The detail is for logs, not clients.
    #[error("Internal failure: {0}")]
    Internal(String),
}

impl IncidentError {
    /// Invalid input carrying only a top-level message.
    pub fn invalid(message: impl Into<String>) -> Self {
        let message = message.into();
        let mut details = ValidationDetails::new();
        details.form(message.clone());
        Self::InvalidInput { message, details }
    }

    pub fn invalid_id() -> Self {
        Self::invalid("Invalid incident ID")
    }

    pub fn no_fields() -> Self {
        Self::invalid("No fields provided for update")
    }

    /// Stable kind label used in wire payloads and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::InvalidInput { .. } => "InvalidInput",
            Self::NotFound => "NotFound",
            Self::Internal(_) => "InternalFailure",
        }
    }

    pub fn details(&self) -> Option<&ValidationDetails> {
        match self {
            Self::InvalidInput { details, .. } => Some(details),
            _ => None,
        }
    }
}

impl From<StoreError> for IncidentError {
    fn from(e: StoreError) -> Self {
        IncidentError::Internal(e.to_string())
    }
}

/// Record store failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing engine rejected the operation.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A stored row could not be mapped back to an incident.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The store was closed at shutdown.
    #[error("store is closed")]
    Closed,

    /// A blocking store task was cancelled or panicked.
    #[error("store task failed: {0}")]
    Task(String),
}

/// Result type for incident operations
pub type IncidentResult<T> = Result<T, IncidentError>;

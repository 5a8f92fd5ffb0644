//! HTTP error payloads.
//!
//! Every failure leaves the server as
//! `{"error": {"kind", "message", "fieldErrors", "formErrors"}}`
//! with a status code chosen by kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use incident_core::{IncidentError, ValidationDetails};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Client-facing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
    pub details: ValidationDetails,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    kind: &'a str,
    message: &'a str,
    field_errors: &'a BTreeMap<String, Vec<String>>,
    form_errors: &'a [String],
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            details: ValidationDetails::default(),
        }
    }

    /// Request body was not valid JSON.
    pub fn malformed_body(detail: impl Into<String>) -> Self {
        let mut details = ValidationDetails::new();
        details.form(detail);
        Self {
            details,
            ..Self::new(StatusCode::BAD_REQUEST, "InvalidInput", "Invalid JSON body")
        }
    }

    /// Query string could not be decoded at all.
    pub fn malformed_query(detail: impl Into<String>) -> Self {
        let mut details = ValidationDetails::new();
        details.form(detail);
        Self {
            details,
            ..Self::new(
                StatusCode::BAD_REQUEST,
                "InvalidInput",
                "Invalid query parameters",
            )
        }
    }

    pub fn payload_too_large(limit: usize) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "InvalidInput",
            format!("Request body exceeds {limit} bytes"),
        )
    }

    pub fn timeout() -> Self {
        Self::new(
            StatusCode::GATEWAY_TIMEOUT,
            "InternalFailure",
            "Request timed out",
        )
    }

    pub fn unauthorized() -> Self {
        IncidentError::Unauthorized.into()
    }

    pub fn route_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "NotFound", "Route not found")
    }

    /// JSON body of this error.
    pub fn body(&self) -> serde_json::Value {
        serde_json::to_value(ErrorEnvelope {
            error: ErrorBody {
                kind: self.kind,
                message: &self.message,
                field_errors: &self.details.field_errors,
                form_errors: &self.details.form_errors,
            },
        })
        .unwrap_or_default()
    }
}

impl From<IncidentError> for ApiError {
    fn from(e: IncidentError) -> Self {
        let kind = e.kind();
        match e {
            IncidentError::Unauthorized => {
                Self::new(StatusCode::UNAUTHORIZED, kind, "Unauthorized")
            }
            IncidentError::InvalidInput { message, details } => Self {
                status: StatusCode::BAD_REQUEST,
                kind,
                message,
                details,
            },
            IncidentError::NotFound => {
                Self::new(StatusCode::NOT_FOUND, kind, "Incident not found")
            }
            // Detail already logged by the service.
            IncidentError::Internal(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                kind,
                "Internal server error",
            ),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status.as_u16(), self.kind, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body())).into_response()
    }
}

/// Result type for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Server-level errors (startup, bind, serve)
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// The accept loop failed
    #[error("server error: {0}")]
    Serve(String),
}

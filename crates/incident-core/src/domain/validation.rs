//! Payload validation for incident creation and partial updates.
//!
//! Payloads arrive as loosely-typed JSON. Each recognized key is checked
//! independently so that a single response lists every problem; unknown
//! keys (including any client-supplied owner) are ignored.

use super::entities::{IncidentUpdate, NewIncident, Severity, Status};
use super::errors::{IncidentError, ValidationDetails};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Parse an incident identifier.
///
/// # Errors
/// `InvalidInput` ("Invalid incident ID") unless `raw` is a UUID in the
/// hyphenated 8-4-4-4-12 form. Simple, braced and URN forms are rejected.
pub fn parse_incident_id(raw: &str) -> Result<Uuid, IncidentError> {
    if !is_hyphenated_uuid(raw) {
        return Err(IncidentError::invalid_id());
    }
    Uuid::parse_str(raw).map_err(|_| IncidentError::invalid_id())
}

fn is_hyphenated_uuid(raw: &str) -> bool {
    raw.len() == 36
        && raw.bytes().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
}

/// Validate a creation payload.
///
/// `title`, `service` and `severity` are required; `status` defaults to
/// `OPEN`; `summary` is optional and `null` is treated as absent.
pub fn parse_new_incident(payload: &Value) -> Result<NewIncident, IncidentError> {
    let mut details = ValidationDetails::new();
    let Some(object) = expect_object(&mut details, payload) else {
        return Err(invalid_payload(details));
    };

    let title = required_text(&mut details, object, "title");
    let service = required_text(&mut details, object, "service");
    let severity = match object.get("severity") {
        None | Some(Value::Null) => {
            details.field("severity", "Required");
            None
        }
        Some(value) => enum_value::<Severity>(&mut details, "severity", value),
    };
    let status = optional_enum::<Status>(&mut details, object, "status");
    let summary = optional_text(&mut details, object, "summary").flatten();

    match (title, service, severity) {
        (Some(title), Some(service), Some(severity)) if details.is_empty() => Ok(NewIncident {
            title,
            service,
            severity,
            status: status.unwrap_or_default(),
            summary,
        }),
        _ => Err(invalid_payload(details)),
    }
}

/// Validate a partial-update payload.
///
/// Only `severity`, `status` and `summary` are recognized. An empty result
/// is *not* an error here; the mutation service checks non-emptiness after
/// shape validation so the two failures stay distinguishable.
pub fn parse_incident_update(payload: &Value) -> Result<IncidentUpdate, IncidentError> {
    let mut details = ValidationDetails::new();
    let Some(object) = expect_object(&mut details, payload) else {
        return Err(invalid_payload(details));
    };

    let update = IncidentUpdate {
        severity: non_null_enum::<Severity>(&mut details, object, "severity"),
        status: non_null_enum::<Status>(&mut details, object, "status"),
        summary: optional_text(&mut details, object, "summary"),
    };

    details.into_result("Invalid incident payload")?;
    Ok(update)
}

fn invalid_payload(details: ValidationDetails) -> IncidentError {
    IncidentError::InvalidInput {
        message: "Invalid incident payload".to_string(),
        details,
    }
}

fn expect_object<'a>(
    details: &mut ValidationDetails,
    payload: &'a Value,
) -> Option<&'a Map<String, Value>> {
    match payload {
        Value::Object(object) => Some(object),
        other => {
            details.form(format!("Expected object, received {}", json_type(other)));
            None
        }
    }
}

fn required_text(
    details: &mut ValidationDetails,
    object: &Map<String, Value>,
    key: &str,
) -> Option<String> {
    match object.get(key) {
        None | Some(Value::Null) => {
            details.field(key, "Required");
            None
        }
        Some(Value::String(text)) if text.trim().is_empty() => {
            details.field(key, "String must contain at least 1 non-blank character(s)");
            None
        }
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            details.field(key, type_mismatch("string", other));
            None
        }
    }
}

/// `None` when absent, `Some(None)` for an explicit `null`.
fn optional_text(
    details: &mut ValidationDetails,
    object: &Map<String, Value>,
    key: &str,
) -> Option<Option<String>> {
    match object.get(key)? {
        Value::Null => Some(None),
        Value::String(text) => Some(Some(text.clone())),
        other => {
            details.field(key, type_mismatch("string", other));
            None
        }
    }
}

/// Absent or `null` are both treated as "not supplied".
fn optional_enum<T>(
    details: &mut ValidationDetails,
    object: &Map<String, Value>,
    key: &str,
) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: ToString,
{
    match object.get(key)? {
        Value::Null => None,
        value => enum_value(details, key, value),
    }
}

/// Absent is "not supplied"; `null` is rejected since the field cannot be cleared.
fn non_null_enum<T>(
    details: &mut ValidationDetails,
    object: &Map<String, Value>,
    key: &str,
) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: ToString,
{
    let value = object.get(key)?;
    enum_value(details, key, value)
}

fn enum_value<T>(details: &mut ValidationDetails, key: &str, value: &Value) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: ToString,
{
    match value {
        Value::String(text) => match text.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                details.field(key, e.to_string());
                None
            }
        },
        other => {
            details.field(key, type_mismatch("string", other));
            None
        }
    }
}

fn type_mismatch(expected: &str, received: &Value) -> String {
    format!("Expected {expected}, received {}", json_type(received))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

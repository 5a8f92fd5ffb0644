//! List query builder.
//!
//! Turns the untrusted, string-typed list parameters into a typed
//! [`IncidentQuery`]. Every parameter is checked; all failures are collected
//! and reported together as one `InvalidInput` error.

use super::entities::{Incident, Severity, Status};
use super::errors::{IncidentError, ValidationDetails};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Raw list parameters exactly as received. Absent parameters are `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub service: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListParams {
    /// Collect decoded query pairs. The first occurrence of a key wins and
    /// unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                "severity" => &mut params.severity,
                "status" => &mut params.status,
                "service" => &mut params.service,
                "search" => &mut params.search,
                "sortBy" => &mut params.sort_by,
                "sortOrder" => &mut params.sort_order,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        params
    }
}

/// Equality and substring predicates, combined with AND.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub severity: Option<Severity>,
    pub status: Option<Status>,
    /// Exact match on the service name.
    pub service: Option<String>,
    /// Case-insensitive substring of `title` OR `summary`.
    pub search: Option<String>,
}

impl FilterSpec {
    /// True when `incident` satisfies every active predicate.
    pub fn matches(&self, incident: &Incident) -> bool {
        self.severity.map_or(true, |sev| incident.severity == sev)
            && self.status.map_or(true, |status| incident.status == status)
            && self
                .service
                .as_deref()
                .map_or(true, |service| incident.service == service)
            && self.search.as_deref().map_or(true, |needle| {
                contains_ignore_case(&incident.title, needle)
                    || incident
                        .summary
                        .as_deref()
                        .is_some_and(|summary| contains_ignore_case(summary, needle))
            })
    }

    pub fn is_empty(&self) -> bool {
        self.severity.is_none()
            && self.status.is_none()
            && self.service.is_none()
            && self.search.is_none()
    }
}

/// Unicode-aware case-insensitive substring test.
///
/// Shared by every store adapter so that search semantics do not depend on
/// the backing engine's collation.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Closed set of sortable columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortField {
    CreatedAt,
    Severity,
    Status,
    Service,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        Self::CreatedAt,
        Self::Severity,
        Self::Status,
        Self::Service,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::Severity => "severity",
            Self::Status => "status",
            Self::Service => "service",
        }
    }

    /// Ascending comparison on this field alone. Enums compare by ordinal.
    pub fn compare(self, a: &Incident, b: &Incident) -> Ordering {
        match self {
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::Severity => a.severity.cmp(&b.severity),
            Self::Status => a.status.cmp(&b.status),
            Self::Service => a.service.cmp(&b.service),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid enum value. Expected 'createdAt' | 'severity' | 'status' | 'service', received '{s}'"
                )
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!(
                "Invalid enum value. Expected 'asc' | 'desc', received '{other}'"
            )),
        }
    }
}

/// Single-field ordering. Ties between equal keys are not broken, so their
/// relative order is unspecified and may differ between stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    pub fn compare(&self, a: &Incident, b: &Incident) -> Ordering {
        let ordering = self.field.compare(a, b);
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Result window. `page` is 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSpec {
    pub page: u64,
    pub limit: u32,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageSpec {
    /// Number of matching records skipped before this page.
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(u64::from(self.limit))
    }

    /// `ceil(total / limit)`; zero when there are no matches.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit.max(1)))
    }
}

/// Validated list query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncidentQuery {
    pub filter: FilterSpec,
    pub sort: SortSpec,
    pub page: PageSpec,
}

impl IncidentQuery {
    /// Validate raw parameters.
    ///
    /// # Errors
    /// `InvalidInput` with one entry per offending parameter.
    pub fn parse(params: &ListParams) -> Result<Self, IncidentError> {
        let mut details = ValidationDetails::new();

        // No upper bound on `page`: a page past the end is simply empty.
        let page = parse_bounded(&mut details, "page", params.page.as_deref(), 1, None)
            .unwrap_or(DEFAULT_PAGE);
        let limit = parse_bounded(
            &mut details,
            "limit",
            params.limit.as_deref(),
            1,
            Some(u64::from(MAX_LIMIT)),
        )
        .and_then(|limit| u32::try_from(limit).ok())
        .unwrap_or(DEFAULT_LIMIT);

        let severity = parse_field(&mut details, "severity", params.severity.as_deref(), |s| {
            s.parse::<Severity>().map_err(|e| e.to_string())
        });
        let status = parse_field(&mut details, "status", params.status.as_deref(), |s| {
            s.parse::<Status>().map_err(|e| e.to_string())
        });

        // An empty service parameter is treated as not supplied.
        let service = params.service.clone().filter(|s| !s.is_empty());

        let search = parse_field(&mut details, "search", params.search.as_deref(), |s| {
            if s.is_empty() {
                Err("String must contain at least 1 character(s)".to_string())
            } else {
                Ok(s.to_string())
            }
        });

        let sort_by = parse_field(&mut details, "sortBy", params.sort_by.as_deref(), |s| {
            s.parse::<SortField>()
        });
        let sort_order = parse_field(
            &mut details,
            "sortOrder",
            params.sort_order.as_deref(),
            |s| s.parse::<SortDirection>(),
        );

        details.into_result("Invalid query parameters")?;

        // `sortOrder` only has meaning alongside `sortBy`.
        let sort = match sort_by {
            Some(field) => SortSpec {
                field,
                direction: sort_order.unwrap_or(SortDirection::Asc),
            },
            None => SortSpec::default(),
        };

        Ok(Self {
            filter: FilterSpec {
                severity,
                status,
                service,
                search,
            },
            sort,
            page: PageSpec { page, limit },
        })
    }
}

/// Run `parse` on a present parameter, recording its error under `name`.
fn parse_field<T>(
    details: &mut ValidationDetails,
    name: &str,
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Option<T> {
    let raw = raw?;
    match parse(raw) {
        Ok(value) => Some(value),
        Err(message) => {
            details.field(name, message);
            None
        }
    }
}

/// Coerce a numeric parameter and check it against `[min, max]`. Integral
/// values beyond `u64::MAX` saturate when `max` is `None`.
fn parse_bounded(
    details: &mut ValidationDetails,
    name: &str,
    raw: Option<&str>,
    min: u64,
    max: Option<u64>,
) -> Option<u64> {
    parse_field(details, name, raw, |raw| {
        let value = coerce_number(raw)?;
        if value.fract() != 0.0 {
            return Err("Expected integer, received float".to_string());
        }
        if value < min as f64 {
            return Err(format!("Number must be greater than or equal to {min}"));
        }
        if let Some(max) = max {
            if value > max as f64 {
                return Err(format!("Number must be less than or equal to {max}"));
            }
        }
        // Integral and at least `min`; `as` saturates above u64::MAX.
        Ok(value as u64)
    })
}

/// Numeric coercion of a query string value. Blank input coerces to zero.
fn coerce_number(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err("Expected number, received nan".to_string()),
    }
}

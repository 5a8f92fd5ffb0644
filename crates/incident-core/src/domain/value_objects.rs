//! Result envelopes returned by the query service.

use super::entities::Incident;
use super::query::PageSpec;
use serde::{Deserialize, Serialize};

/// Pagination metadata for a list response.
///
/// `total` counts every record matching the filter, independent of the
/// page window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u32,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: PageSpec, total: u64) -> Self {
        Self {
            total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages(total),
        }
    }
}

/// One page of incidents plus its pagination metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentPage {
    pub data: Vec<Incident>,
    pub pagination: Pagination,
}

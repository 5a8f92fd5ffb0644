//! Cross-crate integration tests.

pub mod http_flows;
pub mod properties;
pub mod store_parity;

use chrono::{DateTime, Duration, Utc};
use incident_core::test_utils::IncidentBuilder;
use incident_core::{Incident, Severity, Status};

/// Fixed reference instant for fixtures.
pub fn fixture_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T09:00:00Z")
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// A small, varied data set with distinct creation times.
pub fn fixture_incidents() -> Vec<Incident> {
    let services = ["Auth Service", "Billing Service", "API Gateway"];
    (0..30)
        .map(|i: usize| {
            let summary = match i % 3 {
                0 => None,
                1 => Some("Database CONNECTION pool exhausted"),
                _ => Some("Upstream latency"),
            };
            IncidentBuilder::new()
                .title(&format!("Incident {i} in checkout"))
                .service(services[i % services.len()])
                .severity(Severity::ALL[i % Severity::ALL.len()])
                .status(Status::ALL[(i / 2) % Status::ALL.len()])
                .summary(summary)
                .owner(&format!("user-{}", i % 4 + 1))
                .created_at(fixture_now() - Duration::minutes(i as i64 * 7))
                .build()
        })
        .collect()
}

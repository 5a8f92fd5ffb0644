//! Development data reset.
//!
//! Clears every incident and inserts a generated batch spread across a fixed
//! set of services, owners and creation times. Owners are opaque `user-N`
//! identifiers.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use incident_core::{Incident, IncidentStore, Severity, Status, StoreError};
use rand::Rng;
use tracing::info;
use uuid::Uuid;

/// Services incidents are drawn from.
pub const SERVICES: [&str; 8] = [
    "Auth Service",
    "Billing Service",
    "Notification Service",
    "API Gateway",
    "User Service",
    "Reporting Service",
    "Search Service",
    "Analytics Service",
];

pub const SEED_SUMMARY: &str = "Auto-generated incident for testing pagination and filtering.";

/// Relative frequency of each severity, out of 100.
const SEVERITY_WEIGHTS: [(Severity, u32); 4] = [
    (Severity::Sev1, 10),
    (Severity::Sev2, 20),
    (Severity::Sev3, 40),
    (Severity::Sev4, 30),
];

/// Seed errors
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("seed needs at least one owner")]
    NoUsers,

    #[error("a window of {0} days reaches outside the supported date range")]
    WindowTooLarge(u32),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Shape of the generated data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOptions {
    pub count: u32,
    pub users: u32,
    /// `createdAt` falls within this many days before now.
    pub days: u32,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            count: 200,
            users: 8,
            days: 90,
        }
    }
}

/// Outcome of a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub removed: u64,
    pub inserted: u64,
}

/// Generate `options.count` incidents relative to `now`.
pub fn generate_incidents<R>(
    options: &SeedOptions,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<Vec<Incident>, SeedError>
where
    R: Rng + ?Sized,
{
    if options.users == 0 {
        return Err(SeedError::NoUsers);
    }

    let too_large = || SeedError::WindowTooLarge(options.days);
    let window = Duration::try_days(i64::from(options.days)).ok_or_else(too_large)?;
    let window_us = window.num_microseconds().ok_or_else(too_large)?;
    now.checked_sub_signed(window).ok_or_else(too_large)?;

    let mut incidents = Vec::with_capacity(options.count as usize);
    for i in 1..=options.count {
        let service = SERVICES[rng.gen_range(0..SERVICES.len())];
        let age = Duration::microseconds(rng.gen_range(0..=window_us));
        let created_at = now.checked_sub_signed(age).ok_or_else(too_large)?;
        incidents.push(Incident {
            id: Uuid::new_v4(),
            title: format!("Incident #{i} - {service} issue"),
            service: service.to_string(),
            severity: weighted_severity(rng),
            status: Status::ALL[rng.gen_range(0..Status::ALL.len())],
            summary: Some(SEED_SUMMARY.to_string()),
            owner_id: format!("user-{}", rng.gen_range(1..=options.users)),
            created_at: created_at.trunc_subsecs(6),
        });
    }
    Ok(incidents)
}

fn weighted_severity<R: Rng + ?Sized>(rng: &mut R) -> Severity {
    let total: u32 = SEVERITY_WEIGHTS.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.gen_range(0..total);
    for (severity, weight) in SEVERITY_WEIGHTS {
        if roll < weight {
            return severity;
        }
        roll -= weight;
    }
    Severity::Sev4
}

/// Replace the store contents with `incidents`.
pub async fn reseed(
    store: &dyn IncidentStore,
    incidents: Vec<Incident>,
) -> Result<SeedReport, SeedError> {
    let removed = store.delete_all().await?;
    info!(removed, "[incidents] Cleared existing incidents");

    let inserted = store.create_many(incidents).await?;
    info!(inserted, "[incidents] Inserted seed incidents");

    Ok(SeedReport { removed, inserted })
}

//! Incident API - HTTP (JSON) surface of the incident tracker.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      INCIDENT API                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Middleware Stack                                            │
//! │  CORS → Tracing → Timeout → Body limit → Identity            │
//! │                         │                                    │
//! │  Routes                 ▼                                    │
//! │  GET/POST /api/incidents, GET/PATCH /api/incidents/:id       │
//! │  GET /health                                                 │
//! └─────────────────────────┬────────────────────────────────────┘
//!                           │ Arc<dyn IncidentApi>
//!                           ▼
//!                 incident-core IncidentService
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use incident_api::{ApiConfig, IncidentApiService};
//!
//! let service = IncidentApiService::new(config, Arc::new(IncidentService::new(store)))?;
//! service.serve(shutdown_signal()).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod service;

pub use domain::{ApiConfig, ApiError, ApiResult, ConfigError, ServerError, StoreBackend};
pub use middleware::{IdentityProvider, SessionTokenIdentity, TrustedHeaderIdentity};
pub use router::build_router;
pub use service::IncidentApiService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

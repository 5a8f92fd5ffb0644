//! # Incident Core
//!
//! Domain model, list query builder, and the query/mutation services of the
//! incident tracker. Transport-agnostic: the HTTP surface lives in
//! `incident-api`, process wiring in `incident-server`.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/memory.rs - InMemoryIncidentStore                     │
//! │  adapters/sqlite.rs - SqliteIncidentStore (feature "sqlite")    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - IncidentApi trait                          │
//! │  ports/outbound.rs - IncidentStore, TimeSource traits           │
//! │  service/          - IncidentService (implements IncidentApi)   │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/entities.rs      - Incident, Severity, Status, CallerId │
//! │  domain/query.rs         - ListParams → IncidentQuery           │
//! │  domain/validation.rs    - create / update payload checks       │
//! │  domain/value_objects.rs - IncidentPage, Pagination             │
//! │  domain/errors.rs        - IncidentError, StoreError            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Kinds
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | `Unauthorized` | no caller identity was resolved |
//! | `InvalidInput` | malformed id, query parameter, or payload |
//! | `NotFound` | well-formed id with no record |
//! | `InternalFailure` | the store failed |

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
pub use service::IncidentService;

//! # Domain Layer
//!
//! Pure incident logic with no I/O.
//!
//! ## Components
//!
//! - `entities`: Incident, Severity, Status, CallerId, NewIncident, IncidentUpdate
//! - `query`: list parameter parsing into filter / sort / page specifications
//! - `validation`: creation and partial-update payload checks
//! - `value_objects`: Pagination, IncidentPage
//! - `errors`: IncidentError taxonomy, ValidationDetails, StoreError

pub mod entities;
pub mod errors;
pub mod query;
pub mod validation;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use query::*;
pub use validation::*;
pub use value_objects::*;

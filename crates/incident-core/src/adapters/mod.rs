//! Store adapters.
//!
//! - `memory`: process-local store for tests and development
//! - `sqlite`: durable store backed by an embedded SQLite database

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::InMemoryIncidentStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteIncidentStore;

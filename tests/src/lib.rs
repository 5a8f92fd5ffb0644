//! # Incident Desk Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── list_benchmarks.rs   # List path over both stores
//! └── src/integration/
//!     ├── http_flows.rs        # Server wiring end to end over HTTP
//!     ├── store_parity.rs      # Memory and SQLite answer identically
//!     └── properties.rs        # Pagination and filter invariants
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p incident-tests
//!
//! # By category
//! cargo test -p incident-tests integration::store_parity::
//!
//! # Benchmarks
//! cargo bench -p incident-tests
//! ```

pub mod integration;

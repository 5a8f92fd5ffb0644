//! Middleware stack for the incident API.
//!
//! Layer order: Request → CORS → Tracing → Timeout → Validation (body size) → Identity → Handler

pub mod cors;
pub mod identity;
pub mod timeout;
pub mod tracing;
pub mod validation;

pub use cors::create_cors_layer;
pub use identity::{
    constant_time_compare, identity_from_config, ChainedIdentity, IdentityLayer,
    IdentityProvider, SessionTokenIdentity, TrustedHeaderIdentity,
};
pub use timeout::TimeoutLayer;
pub use tracing::{TracingLayer, REQUEST_ID_HEADER};
pub use validation::ValidationLayer;

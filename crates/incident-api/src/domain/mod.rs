//! Configuration and error types for the HTTP surface.

pub mod config;
pub mod error;

pub use config::{
    ApiConfig, ConfigError, CorsConfig, HttpConfig, IdentityConfig, LimitsConfig, StoreBackend,
    StoreConfig, TimeoutConfig,
};
pub use error::{ApiError, ApiResult, ServerError};

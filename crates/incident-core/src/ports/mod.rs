//! Ports layer.
//!
//! - Inbound (driving) port: [`IncidentApi`], the operations exposed to transports
//! - Outbound (driven) ports: [`IncidentStore`] and [`TimeSource`]

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;

//! HTTP routes.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /api/incidents` | [`incidents::list_incidents`] |
//! | `POST /api/incidents` | [`incidents::create_incident`] |
//! | `GET /api/incidents/:id` | [`incidents::get_incident`] |
//! | `PATCH /api/incidents/:id` | [`incidents::update_incident`] |
//! | `GET /health` | [`health::health_check`] |

pub mod health;
pub mod incidents;

use incident_core::IncidentApi;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub incidents: Arc<dyn IncidentApi>,
}

impl AppState {
    pub fn new(incidents: Arc<dyn IncidentApi>) -> Self {
        Self { incidents }
    }
}

use crate::{dao::storage::SessionStore, dto::health::HealthResponse, state::SharedState};

/// Report the current health of the backend.
pub fn health_status(state: &SharedState) -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
        sessions: state.store().len(),
        connections: state.connections().len(),
    }
}

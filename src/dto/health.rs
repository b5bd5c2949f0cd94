use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status (always "ok" while the process is serving).
    pub status: String,
    /// Number of sessions currently held in memory.
    pub sessions: usize,
    /// Number of live WebSocket connections.
    pub connections: usize,
}

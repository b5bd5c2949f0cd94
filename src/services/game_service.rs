//! Session bootstrap: creation with a unique code, and snapshot reads.

use rand::Rng;
use tracing::info;
use validator::Validate;

use crate::{
    dao::storage::SessionStore,
    dto::game::{CreateGameRequest, GameCreated, SessionSnapshot},
    error::ServiceError,
    state::{SharedState, game::Session},
};

/// Attempts at drawing an unused code before giving up. Collisions over a
/// 32-bit space are vanishingly rare at realistic session counts.
const CODE_ATTEMPTS: usize = 16;

/// Create a new draft session and register it under a fresh code.
pub fn create_session(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameCreated, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

    for _ in 0..CODE_ATTEMPTS {
        let code = generate_code();
        let session = Session::new(code.clone(), request.clone().into());
        let created_at = session.created_at;
        if state.store().insert(session) {
            info!(code, "session created");
            return Ok(GameCreated {
                game_code: code,
                created_at,
            });
        }
    }

    Err(ServiceError::Internal(
        "could not allocate an unused session code".to_string(),
    ))
}

/// Read a full snapshot of a session.
pub async fn snapshot(state: &SharedState, code: &str) -> Result<SessionSnapshot, ServiceError> {
    let handle = state.session(code)?;
    let session = handle.lock().await;
    Ok(SessionSnapshot::from(&*session))
}

/// An 8-character lowercase hexadecimal session code.
fn generate_code() -> String {
    format!("{:08x}", rand::rng().random::<u32>())
}

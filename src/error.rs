//! Error taxonomy: expected rejections are ordinary return values with a
//! stable kind, never panics or closed connections.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::state::{draft::DraftError, roster::RosterError};

/// Errors that can occur in service layer operations.
///
/// Every variant carries a stable machine-readable kind (see
/// [`ServiceError::kind`]) used on the WebSocket error frame, plus a
/// human-readable message via `Display`.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No session exists for the given code.
    #[error("session `{0}` not found")]
    SessionNotFound(String),
    /// Requested role is not valid for the session's player type.
    #[error("invalid role: {0}")]
    InvalidRole(String),
    /// Requested role is already occupied by another participant.
    #[error("role taken: {0}")]
    RoleTaken(String),
    /// Host-only action attempted by a non-host.
    #[error("only the host may perform this action")]
    NotHost,
    /// Start requested after the draft left the lobby.
    #[error("the draft has already started")]
    AlreadyStarted,
    /// Start requested before all required slots were ready.
    #[error("not all required participants are ready")]
    NotAllReady,
    /// Selection attempted outside the active phase range.
    #[error("no selection is possible in the current phase")]
    InvalidPhase,
    /// Actor does not hold the turn for the current phase.
    #[error("it is not your turn to act")]
    NotYourTurn,
    /// A pick was confirmed or submitted without a champion.
    #[error("no champion selected for this phase")]
    MissingSelection,
    /// Confirm requested after the final active phase.
    #[error("the draft for this set is complete")]
    DraftComplete,
    /// Set-result confirmation requested outside phase 21.
    #[error("the session is not awaiting a set result")]
    NotAwaitingResult,
    /// Declared winner was not `blue` or `red`.
    #[error("invalid winner `{0}`, expected `blue` or `red`")]
    InvalidWinner(String),
    /// Side choice requested outside phase 22.
    #[error("the session is not in the side-choice phase")]
    NotSideChoicePhase,
    /// Side choice was not `keep` or `swap`.
    #[error("invalid side choice `{0}`, expected `keep` or `swap`")]
    InvalidChoice(String),
    /// The acting connection has not joined a session yet.
    #[error("join a session before issuing commands")]
    NotJoined,
    /// Malformed or out-of-contract input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Unexpected internal fault; in-memory invariants are left intact.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable camelCase kind identifying the failure on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::SessionNotFound(_) => "sessionNotFound",
            ServiceError::InvalidRole(_) => "invalidRole",
            ServiceError::RoleTaken(_) => "roleTaken",
            ServiceError::NotHost => "notHost",
            ServiceError::AlreadyStarted => "alreadyStarted",
            ServiceError::NotAllReady => "notAllReady",
            ServiceError::InvalidPhase => "invalidPhase",
            ServiceError::NotYourTurn => "notYourTurn",
            ServiceError::MissingSelection => "missingSelection",
            ServiceError::DraftComplete => "draftComplete",
            ServiceError::NotAwaitingResult => "notAwaitingResult",
            ServiceError::InvalidWinner(_) => "invalidWinner",
            ServiceError::NotSideChoicePhase => "notSideChoicePhase",
            ServiceError::InvalidChoice(_) => "invalidChoice",
            ServiceError::NotJoined => "notJoined",
            ServiceError::InvalidInput(_) => "invalidInput",
            ServiceError::Internal(_) => "internalError",
        }
    }
}

impl From<DraftError> for ServiceError {
    fn from(err: DraftError) -> Self {
        match err {
            DraftError::NotHost => ServiceError::NotHost,
            DraftError::AlreadyStarted => ServiceError::AlreadyStarted,
            DraftError::NotAllReady => ServiceError::NotAllReady,
            DraftError::InvalidPhase => ServiceError::InvalidPhase,
            DraftError::NotYourTurn => ServiceError::NotYourTurn,
            DraftError::MissingSelection => ServiceError::MissingSelection,
            DraftError::DraftComplete => ServiceError::DraftComplete,
            DraftError::NotAwaitingResult => ServiceError::NotAwaitingResult,
            DraftError::NotSideChoicePhase => ServiceError::NotSideChoicePhase,
        }
    }
}

impl From<RosterError> for ServiceError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::InvalidRole(role) => ServiceError::InvalidRole(role),
            RosterError::RoleTaken(role) => ServiceError::RoleTaken(role),
            RosterError::UnknownParticipant => ServiceError::NotJoined,
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Action requires authority the caller does not hold.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::SessionNotFound(_) => AppError::NotFound(message),
            ServiceError::NotHost | ServiceError::NotYourTurn => AppError::Forbidden(message),
            ServiceError::InvalidRole(_)
            | ServiceError::InvalidWinner(_)
            | ServiceError::InvalidChoice(_)
            | ServiceError::InvalidInput(_) => AppError::BadRequest(message),
            ServiceError::RoleTaken(_)
            | ServiceError::AlreadyStarted
            | ServiceError::NotAllReady
            | ServiceError::InvalidPhase
            | ServiceError::MissingSelection
            | ServiceError::DraftComplete
            | ServiceError::NotAwaitingResult
            | ServiceError::NotSideChoicePhase
            | ServiceError::NotJoined => AppError::Conflict(message),
            ServiceError::Internal(_) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable_wire_tokens() {
        assert_eq!(
            ServiceError::SessionNotFound("x".into()).kind(),
            "sessionNotFound"
        );
        assert_eq!(ServiceError::NotYourTurn.kind(), "notYourTurn");
        assert_eq!(ServiceError::from(DraftError::NotHost).kind(), "notHost");
        assert_eq!(
            ServiceError::from(RosterError::RoleTaken("team1".into())).kind(),
            "roleTaken"
        );
    }

    #[test]
    fn http_mapping_follows_the_taxonomy() {
        assert!(matches!(
            AppError::from(ServiceError::SessionNotFound("x".into())),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(ServiceError::NotHost),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            AppError::from(ServiceError::RoleTaken("team1".into())),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(ServiceError::InvalidWinner("green".into())),
            AppError::BadRequest(_)
        ));
    }
}

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::game::{CreateGameRequest, GameCreated, SessionSnapshot},
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling session creation and snapshot reads.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", post(create_game))
        .route("/games/{code}", get(get_game))
}

/// Create a fresh draft session and return its join code.
#[utoipa::path(
    post,
    path = "/games",
    tag = "game",
    request_body = CreateGameRequest,
    responses(
        (status = 200, description = "Session created", body = GameCreated),
        (status = 400, description = "Invalid settings payload")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Json(payload): Json<CreateGameRequest>,
) -> Result<Json<GameCreated>, AppError> {
    let created = game_service::create_session(&state, payload)?;
    Ok(Json(created))
}

/// Return the full snapshot of a session.
#[utoipa::path(
    get,
    path = "/games/{code}",
    tag = "game",
    params(("code" = String, Path, description = "Session code")),
    responses(
        (status = 200, description = "Full session snapshot", body = SessionSnapshot),
        (status = 404, description = "No session exists for the code")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = game_service::snapshot(&state, &code).await?;
    Ok(Json(snapshot))
}

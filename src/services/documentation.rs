use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the draft backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::create_game,
        crate::routes::game::get_game,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::GameCreated,
            crate::dto::game::SessionSnapshot,
            crate::dto::game::SettingsSnapshot,
            crate::dto::game::StatusSnapshot,
            crate::dto::game::RosterSnapshot,
            crate::dto::game::ResultSnapshot,
            crate::state::game::PlayerType,
            crate::state::game::MatchFormat,
            crate::state::game::DraftType,
            crate::state::game::SideChoice,
            crate::dto::ws::DraftInboundMessage,
            crate::dto::ws::JoinedReply,
            crate::dto::ws::ErrorReply,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Session creation and snapshots"),
        (name = "draft", description = "WebSocket operations for draft clients"),
    )
)]
pub struct ApiDoc;

/// OpenAPI documentation generation.
pub mod documentation;
/// Draft progression: start, select, confirm, results, side choice.
pub mod draft_service;
/// Session event broadcasting over WebSocket connections.
pub mod events;
/// Session creation and snapshot queries.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Roster membership: join, roles, readiness, departure.
pub mod roster_service;
/// WebSocket connection and command dispatch.
pub mod websocket_service;

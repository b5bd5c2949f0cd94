//! Roster membership: join, role moves, readiness, departure.
//!
//! Every operation locks the target session for its full
//! validate-then-apply span and broadcasts exactly one event on success.

use tracing::info;
use uuid::Uuid;

use crate::{
    config::HostReassignment,
    dto::{
        events::{ClientJoinedEvent, ClientLeftEvent, PositionChangedEvent, ReadyStateChangedEvent},
        game::SessionSnapshot,
        validation::{validate_game_code, validate_nickname},
        ws::JoinedReply,
    },
    error::ServiceError,
    services::events,
    state::{
        SharedState,
        game::{Role, now_micros},
    },
};

/// Join a session, or reconnect a known participant.
///
/// On success the caller receives the participant token (freshly minted
/// for new joiners) plus a full snapshot, and every connection in the
/// session sees a `client_joined` broadcast.
pub async fn join(
    state: &SharedState,
    connection_id: Uuid,
    game_code: &str,
    nickname: &str,
    position: Option<&str>,
    token: Option<String>,
) -> Result<JoinedReply, ServiceError> {
    validate_game_code(game_code)
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
    validate_nickname(nickname).map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
    let role = parse_role(position.unwrap_or("spectator"))?;

    let handle = state.session(game_code)?;
    let mut session = handle.lock().await;

    let now = now_micros();
    let player_type = session.settings.player_type;
    let token = token.unwrap_or_else(|| Uuid::new_v4().simple().to_string());
    let outcome = session.roster.join(
        token,
        connection_id,
        nickname.to_string(),
        role,
        player_type,
        now,
    )?;
    session.status.touch(now);

    info!(
        code = %session.code,
        nickname = %outcome.entry.nickname,
        role = %outcome.entry.role,
        rejoined = outcome.rejoined,
        "participant joined"
    );

    events::broadcast_client_joined(
        state,
        &session.roster.connection_ids(),
        &ClientJoinedEvent {
            nickname: outcome.entry.nickname.clone(),
            role: outcome.entry.role.to_string(),
            is_host: outcome.entry.is_host,
            rejoined: outcome.rejoined,
            timestamp: now,
        },
    );

    Ok(JoinedReply {
        token: outcome.entry.token,
        snapshot: SessionSnapshot::from(&*session),
    })
}

/// Move a participant to a different role slot.
pub async fn change_position(
    state: &SharedState,
    game_code: &str,
    token: &str,
    position: &str,
) -> Result<(), ServiceError> {
    let new_role = parse_role(position)?;

    let handle = state.session(game_code)?;
    let mut session = handle.lock().await;

    let previous_role = session
        .roster
        .get(token)
        .ok_or(ServiceError::NotJoined)?
        .role;
    let player_type = session.settings.player_type;
    let entry = session.roster.change_role(token, new_role, player_type)?;
    let (nickname, new_role) = (entry.nickname.clone(), entry.role);
    let now = now_micros();
    session.status.touch(now);

    events::broadcast_position_changed(
        state,
        &session.roster.connection_ids(),
        &PositionChangedEvent {
            nickname,
            previous_role: previous_role.to_string(),
            new_role: new_role.to_string(),
            timestamp: now,
        },
    );
    Ok(())
}

/// Set a participant's lobby ready flag.
pub async fn set_ready(
    state: &SharedState,
    game_code: &str,
    token: &str,
    ready: bool,
) -> Result<(), ServiceError> {
    let handle = state.session(game_code)?;
    let mut session = handle.lock().await;

    let entry = session.roster.set_ready(token, ready)?;
    let (nickname, role, ready) = (entry.nickname.clone(), entry.role, entry.is_ready);
    let now = now_micros();
    session.status.touch(now);

    events::broadcast_ready_state_changed(
        state,
        &session.roster.connection_ids(),
        &ReadyStateChangedEvent {
            nickname,
            role: role.to_string(),
            ready,
            timestamp: now,
        },
    );
    Ok(())
}

/// Remove a participant from the session entirely, freeing their role.
///
/// Applies the configured host-reassignment policy when the departing
/// participant held host authority. The session itself stays in the
/// store even with an empty roster; expiry is not this layer's job.
pub async fn leave(
    state: &SharedState,
    game_code: &str,
    token: &str,
) -> Result<(), ServiceError> {
    let handle = state.session(game_code)?;
    let mut session = handle.lock().await;

    let entry = session.roster.remove(token).ok_or(ServiceError::NotJoined)?;
    let now = now_micros();
    session.status.touch(now);

    let new_host = if entry.is_host
        && state.config().host_reassignment == HostReassignment::NextJoiner
    {
        session.roster.reassign_host().map(|promoted| {
            info!(code = %session.code, nickname = %promoted.nickname, "host reassigned");
            promoted.nickname
        })
    } else {
        None
    };

    events::broadcast_client_left(
        state,
        &session.roster.connection_ids(),
        &ClientLeftEvent {
            nickname: entry.nickname.clone(),
            role: entry.role.to_string(),
            was_host: entry.is_host,
            left_roster: true,
            new_host,
            timestamp: now,
        },
    );
    Ok(())
}

/// Detach a dropped connection from its roster entry, keeping the entry
/// reserved for a reconnect.
pub async fn disconnect(state: &SharedState, game_code: &str, connection_id: Uuid) {
    let Ok(handle) = state.session(game_code) else {
        return;
    };
    let mut session = handle.lock().await;

    let Some(entry) = session.roster.detach(connection_id) else {
        return;
    };
    let now = now_micros();
    session.status.touch(now);

    info!(
        code = %session.code,
        nickname = %entry.nickname,
        "participant disconnected"
    );

    events::broadcast_client_left(
        state,
        &session.roster.connection_ids(),
        &ClientLeftEvent {
            nickname: entry.nickname.clone(),
            role: entry.role.to_string(),
            was_host: entry.is_host,
            left_roster: false,
            new_host: None,
            timestamp: now,
        },
    );
}

fn parse_role(position: &str) -> Result<Role, ServiceError> {
    position
        .parse()
        .map_err(|_| ServiceError::InvalidRole(position.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dto::game::CreateGameRequest,
        services::game_service,
        state::{AppState, ClientConnection},
    };

    /// Drain the frames queued on a captured connection channel.
    fn frames(
        rx: &mut tokio::sync::mpsc::UnboundedReceiver<axum::extract::ws::Message>,
    ) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let axum::extract::ws::Message::Text(text) = message {
                out.push(serde_json::from_str(text.as_str()).unwrap());
            }
        }
        out
    }

    async fn new_session(state: &SharedState, player_type: &str) -> String {
        let request: CreateGameRequest = serde_json::from_str(&format!(
            r#"{{
                "version": "1",
                "draftType": "tournament",
                "playerType": "{player_type}",
                "matchFormat": "bo1",
                "timeLimit": false,
                "name": "scrim"
            }}"#
        ))
        .unwrap();
        game_service::create_session(state, request).unwrap().game_code
    }

    #[tokio::test]
    async fn join_returns_token_and_snapshot() {
        let state = AppState::new(AppConfig::default());
        let code = new_session(&state, "1v1").await;

        let reply = join(&state, Uuid::new_v4(), &code, "alice", Some("team1"), None)
            .await
            .unwrap();
        assert!(!reply.token.is_empty());
        assert_eq!(reply.snapshot.roster.len(), 1);
        assert_eq!(reply.snapshot.roster[0].role, "team1");
        assert!(reply.snapshot.roster[0].is_host);
    }

    #[tokio::test]
    async fn join_defaults_to_spectator() {
        let state = AppState::new(AppConfig::default());
        let code = new_session(&state, "1v1").await;

        let reply = join(&state, Uuid::new_v4(), &code, "sam", None, None)
            .await
            .unwrap();
        assert_eq!(reply.snapshot.roster[0].role, "spectator");
    }

    #[tokio::test]
    async fn join_rejects_bad_input() {
        let state = AppState::new(AppConfig::default());
        let code = new_session(&state, "1v1").await;

        let err = join(&state, Uuid::new_v4(), "not-a-code", "alice", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let err = join(&state, Uuid::new_v4(), &code, "   ", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let err = join(&state, Uuid::new_v4(), &code, "alice", Some("team9"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRole(_)));
    }

    #[tokio::test]
    async fn reconnect_with_token_keeps_identity() {
        let state = AppState::new(AppConfig::default());
        let code = new_session(&state, "1v1").await;

        let first = join(&state, Uuid::new_v4(), &code, "alice", Some("team1"), None)
            .await
            .unwrap();
        set_ready(&state, &code, &first.token, true).await.unwrap();

        let back = join(
            &state,
            Uuid::new_v4(),
            &code,
            "alice",
            Some("spectator"),
            Some(first.token.clone()),
        )
        .await
        .unwrap();
        assert_eq!(back.token, first.token);
        assert_eq!(back.snapshot.roster.len(), 1);
        assert_eq!(back.snapshot.roster[0].role, "team1");
        assert!(back.snapshot.roster[0].is_ready);
    }

    #[tokio::test]
    async fn change_position_respects_occupancy() {
        let state = AppState::new(AppConfig::default());
        let code = new_session(&state, "1v1").await;

        let alice = join(&state, Uuid::new_v4(), &code, "alice", Some("team1"), None)
            .await
            .unwrap();
        let bob = join(&state, Uuid::new_v4(), &code, "bob", Some("team2"), None)
            .await
            .unwrap();

        let err = change_position(&state, &code, &bob.token, "team1")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::RoleTaken(_)));

        change_position(&state, &code, &alice.token, "spectator")
            .await
            .unwrap();
        change_position(&state, &code, &bob.token, "team1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn leave_frees_role_and_keeps_session() {
        let state = AppState::new(AppConfig::default());
        let code = new_session(&state, "1v1").await;

        let alice = join(&state, Uuid::new_v4(), &code, "alice", Some("team1"), None)
            .await
            .unwrap();
        leave(&state, &code, &alice.token).await.unwrap();

        // The session survives an empty roster; it can still be looked up.
        let snapshot = game_service::snapshot(&state, &code).await.unwrap();
        assert!(snapshot.roster.is_empty());

        // The vacated role is free for the next joiner.
        let bob = join(&state, Uuid::new_v4(), &code, "bob", Some("team1"), None)
            .await
            .unwrap();
        assert_eq!(bob.snapshot.roster[0].role, "team1");
    }

    #[tokio::test]
    async fn promotion_is_announced_on_the_leave_frame() {
        let config = AppConfig {
            host_reassignment: crate::config::HostReassignment::NextJoiner,
        };
        let state = AppState::new(config);
        let code = new_session(&state, "1v1").await;

        let alice = join(&state, Uuid::new_v4(), &code, "alice", Some("team1"), None)
            .await
            .unwrap();

        let bob_conn = Uuid::new_v4();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        state
            .connections()
            .insert(bob_conn, ClientConnection { id: bob_conn, tx });
        join(&state, bob_conn, &code, "bob", Some("team2"), None)
            .await
            .unwrap();

        leave(&state, &code, &alice.token).await.unwrap();

        let left = frames(&mut rx)
            .into_iter()
            .find(|frame| frame["event"] == "client_left")
            .expect("client_left frame");
        assert_eq!(left["data"]["nickname"], "alice");
        assert_eq!(left["data"]["wasHost"], true);
        assert_eq!(left["data"]["newHost"], "bob");
    }

    #[tokio::test]
    async fn host_reassignment_follows_config() {
        let config = AppConfig {
            host_reassignment: crate::config::HostReassignment::NextJoiner,
        };
        let state = AppState::new(config);
        let code = new_session(&state, "1v1").await;

        let alice = join(&state, Uuid::new_v4(), &code, "alice", Some("team1"), None)
            .await
            .unwrap();
        join(&state, Uuid::new_v4(), &code, "bob", Some("team2"), None)
            .await
            .unwrap();

        leave(&state, &code, &alice.token).await.unwrap();
        let snapshot = game_service::snapshot(&state, &code).await.unwrap();
        assert!(snapshot.roster.iter().any(|p| p.nickname == "bob" && p.is_host));
    }

    #[tokio::test]
    async fn disconnect_keeps_entry_without_reassigning() {
        let state = AppState::new(AppConfig::default());
        let code = new_session(&state, "1v1").await;

        let conn = Uuid::new_v4();
        join(&state, conn, &code, "alice", Some("team1"), None)
            .await
            .unwrap();
        disconnect(&state, &code, conn).await;

        let snapshot = game_service::snapshot(&state, &code).await.unwrap();
        assert_eq!(snapshot.roster.len(), 1);
        assert!(snapshot.roster[0].is_host);
    }
}

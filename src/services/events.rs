//! Session event broadcasting over the WebSocket connections.
//!
//! Every frame is a JSON envelope `{"event": <name>, "data": <payload>}`.
//! Broadcasts target the connection ids attached to one session's roster;
//! `joined` and `error` go to a single connection only.

use axum::extract::ws::Message;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        events::{
            ChampionSelectedEvent, ClientJoinedEvent, ClientLeftEvent, DraftStartedEvent,
            MatchFinishedEvent, NextSetStartedEvent, PhaseProgressedEvent, PositionChangedEvent,
            ReadyStateChangedEvent, SideChoicePhaseEvent,
        },
        ws::{ErrorReply, JoinedReply},
    },
    error::ServiceError,
    state::SharedState,
};

const EVENT_JOINED: &str = "joined";
const EVENT_ERROR: &str = "error";
const EVENT_CLIENT_JOINED: &str = "client_joined";
const EVENT_CLIENT_LEFT: &str = "client_left";
const EVENT_POSITION_CHANGED: &str = "position_changed";
const EVENT_READY_STATE_CHANGED: &str = "ready_state_changed";
const EVENT_CHAMPION_SELECTED: &str = "champion_selected";
const EVENT_PHASE_PROGRESSED: &str = "phase_progressed";
const EVENT_DRAFT_STARTED: &str = "draft_started";
const EVENT_SIDE_CHOICE_PHASE: &str = "side_choice_phase";
const EVENT_MATCH_FINISHED: &str = "match_finished";
const EVENT_NEXT_SET_STARTED: &str = "next_set_started";

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    event: &'a str,
    data: &'a T,
}

/// Send the private join acknowledgement to one connection.
pub fn send_joined(state: &SharedState, connection_id: Uuid, reply: &JoinedReply) {
    send_to_connection(state, connection_id, EVENT_JOINED, reply);
}

/// Send a rejection frame to the offending connection.
pub fn send_error(state: &SharedState, connection_id: Uuid, err: &ServiceError) {
    let payload = ErrorReply {
        kind: err.kind().to_string(),
        message: err.to_string(),
    };
    send_to_connection(state, connection_id, EVENT_ERROR, &payload);
}

/// Broadcast a participant join or reconnect.
pub fn broadcast_client_joined(state: &SharedState, targets: &[Uuid], payload: &ClientJoinedEvent) {
    send_session_event(state, targets, EVENT_CLIENT_JOINED, payload);
}

/// Broadcast a participant departure or connection drop.
pub fn broadcast_client_left(state: &SharedState, targets: &[Uuid], payload: &ClientLeftEvent) {
    send_session_event(state, targets, EVENT_CLIENT_LEFT, payload);
}

/// Broadcast a role change.
pub fn broadcast_position_changed(
    state: &SharedState,
    targets: &[Uuid],
    payload: &PositionChangedEvent,
) {
    send_session_event(state, targets, EVENT_POSITION_CHANGED, payload);
}

/// Broadcast a ready-flag toggle.
pub fn broadcast_ready_state_changed(
    state: &SharedState,
    targets: &[Uuid],
    payload: &ReadyStateChangedEvent,
) {
    send_session_event(state, targets, EVENT_READY_STATE_CHANGED, payload);
}

/// Broadcast a hovered champion selection.
pub fn broadcast_champion_selected(
    state: &SharedState,
    targets: &[Uuid],
    payload: &ChampionSelectedEvent,
) {
    send_session_event(state, targets, EVENT_CHAMPION_SELECTED, payload);
}

/// Broadcast a confirmed phase advance.
pub fn broadcast_phase_progressed(
    state: &SharedState,
    targets: &[Uuid],
    payload: &PhaseProgressedEvent,
) {
    send_session_event(state, targets, EVENT_PHASE_PROGRESSED, payload);
}

/// Broadcast the draft leaving the lobby.
pub fn broadcast_draft_started(state: &SharedState, targets: &[Uuid], payload: &DraftStartedEvent) {
    send_session_event(state, targets, EVENT_DRAFT_STARTED, payload);
}

/// Broadcast the session entering side-choice negotiation.
pub fn broadcast_side_choice_phase(
    state: &SharedState,
    targets: &[Uuid],
    payload: &SideChoicePhaseEvent,
) {
    send_session_event(state, targets, EVENT_SIDE_CHOICE_PHASE, payload);
}

/// Broadcast the match being decided.
pub fn broadcast_match_finished(
    state: &SharedState,
    targets: &[Uuid],
    payload: &MatchFinishedEvent,
) {
    send_session_event(state, targets, EVENT_MATCH_FINISHED, payload);
}

/// Broadcast the next set's lobby opening.
pub fn broadcast_next_set_started(
    state: &SharedState,
    targets: &[Uuid],
    payload: &NextSetStartedEvent,
) {
    send_session_event(state, targets, EVENT_NEXT_SET_STARTED, payload);
}

fn send_session_event(state: &SharedState, targets: &[Uuid], event: &str, payload: &impl Serialize) {
    let Some(text) = serialize_envelope(event, payload) else {
        return;
    };
    for connection_id in targets {
        if let Some(connection) = state.connections().get(connection_id) {
            let _ = connection.tx.send(Message::Text(text.clone().into()));
        }
    }
}

fn send_to_connection(
    state: &SharedState,
    connection_id: Uuid,
    event: &str,
    payload: &impl Serialize,
) {
    let Some(text) = serialize_envelope(event, payload) else {
        return;
    };
    if let Some(connection) = state.connections().get(&connection_id) {
        let _ = connection.tx.send(Message::Text(text.into()));
    }
}

fn serialize_envelope(event: &str, payload: &impl Serialize) -> Option<String> {
    match serde_json::to_string(&Envelope { event, data: payload }) {
        Ok(text) => Some(text),
        Err(err) => {
            warn!(event, error = %err, "failed to serialize event payload");
            None
        }
    }
}

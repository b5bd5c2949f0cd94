//! WebSocket lifecycle for draft clients: join-first handshake, command
//! dispatch, and disconnect cleanup.
//!
//! Expected rejections are answered with an `error` frame on the same
//! connection; the socket is only closed on transport failures, a missed
//! join deadline, or a client-initiated close.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::DraftInboundMessage,
    error::ServiceError,
    services::{draft_service, events, roster_service},
    state::{ClientConnection, SharedState},
};

/// How long a fresh connection may idle before its first `join` command.
const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// The session a connection has joined.
struct Membership {
    code: String,
    token: String,
}

/// Handle the full lifecycle for an individual draft WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we
    // await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let connection_id = Uuid::new_v4();
    state.connections().insert(
        connection_id,
        ClientConnection {
            id: connection_id,
            tx: outbound_tx.clone(),
        },
    );
    info!(%connection_id, "client connected");

    let mut membership: Option<Membership> = None;

    loop {
        // The join deadline only applies while the connection is anonymous.
        let next = if membership.is_none() {
            match tokio::time::timeout(JOIN_TIMEOUT, receiver.next()).await {
                Ok(next) => next,
                Err(_) => {
                    warn!(%connection_id, "join deadline passed; closing");
                    let _ = outbound_tx.send(Message::Close(None));
                    break;
                }
            }
        } else {
            receiver.next().await
        };

        let Some(message) = next else {
            break;
        };

        match message {
            Ok(Message::Text(text)) => match DraftInboundMessage::from_json_str(&text) {
                Ok(command) => {
                    handle_command(&state, connection_id, &mut membership, command).await;
                }
                Err(err) => {
                    warn!(%connection_id, error = %err, "malformed command frame");
                    events::send_error(
                        &state,
                        connection_id,
                        &ServiceError::InvalidInput(err.to_string()),
                    );
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(%connection_id, error = %err, "websocket error");
                break;
            }
        }
    }

    state.connections().remove(&connection_id);
    if let Some(membership) = membership {
        roster_service::disconnect(&state, &membership.code, connection_id).await;
    }
    info!(%connection_id, "client disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Dispatch one parsed command, answering failures with an error frame.
async fn handle_command(
    state: &SharedState,
    connection_id: Uuid,
    membership: &mut Option<Membership>,
    command: DraftInboundMessage,
) {
    let result = match command {
        DraftInboundMessage::Join {
            game_code,
            nickname,
            position,
            token,
        } => {
            if membership.is_some() {
                Err(ServiceError::InvalidInput(
                    "this connection has already joined a session".to_string(),
                ))
            } else {
                match roster_service::join(
                    state,
                    connection_id,
                    &game_code,
                    &nickname,
                    position.as_deref(),
                    token,
                )
                .await
                {
                    Ok(reply) => {
                        *membership = Some(Membership {
                            code: game_code,
                            token: reply.token.clone(),
                        });
                        events::send_joined(state, connection_id, &reply);
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
        }
        other => {
            let Some(joined) = membership.as_ref() else {
                events::send_error(state, connection_id, &ServiceError::NotJoined);
                return;
            };
            match other {
                DraftInboundMessage::ChangePosition { position } => {
                    roster_service::change_position(state, &joined.code, &joined.token, &position)
                        .await
                }
                DraftInboundMessage::SetReady { ready } => {
                    roster_service::set_ready(state, &joined.code, &joined.token, ready).await
                }
                DraftInboundMessage::SelectChampion { champion } => {
                    draft_service::select_champion(state, &joined.code, &joined.token, &champion)
                        .await
                }
                DraftInboundMessage::ConfirmPhase => {
                    draft_service::confirm_phase(state, &joined.code, &joined.token).await
                }
                DraftInboundMessage::StartDraft => {
                    draft_service::start_draft(state, &joined.code, &joined.token).await
                }
                DraftInboundMessage::ConfirmResult { winner } => {
                    draft_service::confirm_result(state, &joined.code, &joined.token, &winner)
                        .await
                }
                DraftInboundMessage::ChooseSide { choice } => {
                    draft_service::choose_side(state, &joined.code, &joined.token, &choice).await
                }
                DraftInboundMessage::Leave => {
                    let result =
                        roster_service::leave(state, &joined.code, &joined.token).await;
                    if result.is_ok() {
                        *membership = None;
                    }
                    result
                }
                DraftInboundMessage::Join { .. } | DraftInboundMessage::Unknown => {
                    Err(ServiceError::InvalidInput("unknown command".to_string()))
                }
            }
        }
    };

    if let Err(err) = result {
        events::send_error(state, connection_id, &err);
    }
}

/// Drop the writer channel and wait for the writer task to drain.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::game::SessionSnapshot;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
/// Commands accepted from draft WebSocket clients.
///
/// The first frame on a connection must be `join`; every other command is
/// rejected with a `notJoined` error until the handshake completes.
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum DraftInboundMessage {
    /// Join (or rejoin) a session. `token` re-attaches a known participant.
    #[serde(rename = "join")]
    Join {
        /// Code of the session to join.
        game_code: String,
        /// Display nickname.
        nickname: String,
        /// Requested role token; defaults to `spectator` when omitted.
        #[serde(default)]
        position: Option<String>,
        /// Participant token from a previous `joined` reply, for reconnects.
        #[serde(default)]
        token: Option<String>,
    },
    /// Move to a different role slot.
    #[serde(rename = "changePosition")]
    ChangePosition {
        /// Target role token.
        position: String,
    },
    /// Toggle the lobby ready flag.
    #[serde(rename = "setReady")]
    SetReady {
        /// Desired ready state.
        ready: bool,
    },
    /// Hover a champion for the current phase without confirming it.
    #[serde(rename = "selectChampion")]
    SelectChampion {
        /// Champion identifier.
        champion: String,
    },
    /// Lock the current phase's action and advance the draft.
    #[serde(rename = "confirmPhase")]
    ConfirmPhase,
    /// Start the draft (host only).
    #[serde(rename = "startDraft")]
    StartDraft,
    /// Declare the winner of the finished set (host only).
    #[serde(rename = "confirmResult")]
    ConfirmResult {
        /// Winning side token, `blue` or `red`.
        winner: String,
    },
    /// Keep or swap sides for the next set (host only).
    #[serde(rename = "chooseSide")]
    ChooseSide {
        /// `keep` or `swap`.
        choice: String,
    },
    /// Leave the session, freeing the held role.
    #[serde(rename = "leave")]
    Leave,
    #[serde(other)]
    #[doc(hidden)]
    Unknown,
}

impl DraftInboundMessage {
    /// Parse a command from the raw text of a WebSocket frame.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Private reply confirming a successful join.
///
/// Carries the participant token the client must present to reconnect, plus
/// a full snapshot so the client can render without a follow-up fetch.
pub struct JoinedReply {
    /// Stable participant token for this roster entry.
    pub token: String,
    /// Full session snapshot at join time.
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Rejection frame sent to the offending client. The connection stays open.
pub struct ErrorReply {
    /// Stable machine-readable failure kind.
    pub kind: String,
    /// Human-readable description.
    pub message: String,
}

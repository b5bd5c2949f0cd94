//! Payloads broadcast to every connection of a session.

use serde::Serialize;
use utoipa::ToSchema;

use crate::state::game::SideChoice;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a participant joins or reconnects.
pub struct ClientJoinedEvent {
    /// Display nickname.
    pub nickname: String,
    /// Role token the participant holds.
    pub role: String,
    /// Whether the participant holds host authority.
    pub is_host: bool,
    /// True when a known participant re-attached a new connection.
    pub rejoined: bool,
    /// Mutation timestamp, microseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a participant leaves or their connection drops.
pub struct ClientLeftEvent {
    /// Display nickname.
    pub nickname: String,
    /// Role token the participant held.
    pub role: String,
    /// Whether the departing participant held host authority.
    pub was_host: bool,
    /// True for an explicit leave; false for a transport-level drop, which
    /// keeps the roster entry reserved for a reconnect.
    pub left_roster: bool,
    /// Nickname of the participant promoted to host by the reassignment
    /// policy, when the departure vacated host authority.
    pub new_host: Option<String>,
    /// Mutation timestamp, microseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a participant moves to a different role slot.
pub struct PositionChangedEvent {
    /// Display nickname.
    pub nickname: String,
    /// Role token held before the move.
    pub previous_role: String,
    /// Role token held after the move.
    pub new_role: String,
    /// Mutation timestamp, microseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a participant toggles their ready flag.
pub struct ReadyStateChangedEvent {
    /// Display nickname.
    pub nickname: String,
    /// Role token of the participant.
    pub role: String,
    /// New ready state.
    pub ready: bool,
    /// Mutation timestamp, microseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when the acting participant hovers a champion.
pub struct ChampionSelectedEvent {
    /// Display nickname of the acting participant.
    pub nickname: String,
    /// Role token of the acting participant.
    pub role: String,
    /// Phase the selection targets.
    pub phase: u8,
    /// Champion identifier written into the phase slot.
    pub champion: String,
    /// Mutation timestamp, microseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a phase is locked in and the draft advances.
pub struct PhaseProgressedEvent {
    /// Display nickname of the confirming participant.
    pub nickname: String,
    /// Phase that was just confirmed.
    pub confirmed_phase: u8,
    /// Action recorded for the confirmed phase (may be empty for a ban).
    pub confirmed_action: String,
    /// Phase the draft advanced to.
    pub new_phase: u8,
    /// Mutation timestamp, microseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when the host starts the draft.
pub struct DraftStartedEvent {
    /// Display nickname of the host who started the draft.
    pub nickname: String,
    /// Phase the session moved to (always the first ban phase).
    pub phase: u8,
    /// 1-based set counter.
    pub set_number: u32,
    /// Mutation timestamp, microseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a non-final set result moves the session into side choice.
pub struct SideChoicePhaseEvent {
    /// Side that won the completed set.
    pub winner_side: String,
    /// Sets won by team 1 so far.
    pub team1_score: u32,
    /// Sets won by team 2 so far.
    pub team2_score: u32,
    /// Number of the set that just completed.
    pub set_number: u32,
    /// Mutation timestamp, microseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when the final set result completes the match.
pub struct MatchFinishedEvent {
    /// Side that won the final set.
    pub winner_side: String,
    /// Team token of the match winner.
    pub winner_team: String,
    /// Final sets won by team 1.
    pub team1_score: u32,
    /// Final sets won by team 2.
    pub team2_score: u32,
    /// Mutation timestamp, microseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when the host's side choice opens the next set's lobby.
pub struct NextSetStartedEvent {
    /// 1-based number of the new set.
    pub set_number: u32,
    /// Side now held by team 1.
    pub team1_side: String,
    /// Side now held by team 2.
    pub team2_side: String,
    /// The decision that produced this arrangement.
    pub side_choice: SideChoice,
    /// Mutation timestamp, microseconds since the Unix epoch.
    pub timestamp: i64,
}

//! REST payloads: session creation and the snapshot query.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::state::game::{
    DraftType, GameResult, GameSettings, GameStatus, MatchFormat, PlayerType, Session, SideChoice,
};

/// Request body for creating a new draft session.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    /// Engine-version tag reported by the client.
    #[validate(length(min = 1, max = 32))]
    pub version: String,
    /// Draft ruleset variant.
    pub draft_type: DraftType,
    /// Participant topology.
    pub player_type: PlayerType,
    /// Best-of-N format.
    pub match_format: MatchFormat,
    /// Whether clients should render a per-turn timer.
    pub time_limit: bool,
    /// Champions banned for the whole match.
    #[serde(default)]
    pub global_bans: Vec<String>,
    /// Optional banner image reference.
    #[serde(default)]
    pub banner_image: Option<String>,
    /// Display name of the session.
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

impl From<CreateGameRequest> for GameSettings {
    fn from(value: CreateGameRequest) -> Self {
        Self {
            version: value.version,
            draft_type: value.draft_type,
            player_type: value.player_type,
            match_format: value.match_format,
            time_limit: value.time_limit,
            global_bans: value.global_bans,
            banner_image: value.banner_image,
            name: value.name,
        }
    }
}

/// Response for a successful session creation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameCreated {
    /// Short code other participants use to join.
    pub game_code: String,
    /// Creation timestamp, microseconds since the Unix epoch.
    pub created_at: i64,
}

/// Immutable settings as exposed on the snapshot.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    /// Participant topology.
    pub player_type: PlayerType,
    /// Best-of-N format.
    pub match_format: MatchFormat,
    /// Draft ruleset variant.
    pub draft_type: DraftType,
    /// Engine-version tag.
    pub version: String,
    /// Whether clients should render a per-turn timer.
    pub time_limit: bool,
    /// Champions banned for the whole match.
    pub global_bans: Vec<String>,
    /// Optional banner image reference.
    pub banner_image: Option<String>,
    /// Display name of the session.
    pub name: String,
}

impl From<&GameSettings> for SettingsSnapshot {
    fn from(value: &GameSettings) -> Self {
        Self {
            player_type: value.player_type,
            match_format: value.match_format,
            draft_type: value.draft_type,
            version: value.version.clone(),
            time_limit: value.time_limit,
            global_bans: value.global_bans.clone(),
            banner_image: value.banner_image.clone(),
            name: value.name.clone(),
        }
    }
}

/// Live draft status as exposed on the snapshot.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    /// Current phase counter.
    pub phase: u8,
    /// Per-phase action log for the current set.
    pub phase_data: Vec<String>,
    /// 1-based set counter.
    pub set_number: u32,
    /// Timestamp of the latest mutation, microseconds since the Unix epoch.
    pub last_updated_at: i64,
    /// Side currently held by team 1 (`blue` or `red`).
    pub team1_side: String,
    /// Side currently held by team 2.
    pub team2_side: String,
    /// Display name for team 1.
    pub team1_name: String,
    /// Display name for team 2.
    pub team2_name: String,
    /// Champions picked in prior sets, keyed by team token.
    pub previous_set_picks: HashMap<String, Vec<String>>,
}

impl From<&GameStatus> for StatusSnapshot {
    fn from(value: &GameStatus) -> Self {
        Self {
            phase: value.phase,
            phase_data: value.phase_data.clone(),
            set_number: value.set_number,
            last_updated_at: value.last_updated_at,
            team1_side: value.team1_side.to_string(),
            team2_side: value.team2_side.to_string(),
            team1_name: value.team1_name.clone(),
            team2_name: value.team2_name.clone(),
            previous_set_picks: value
                .previous_set_picks
                .iter()
                .map(|(team, picks)| (team.to_string(), picks.clone()))
                .collect(),
        }
    }
}

/// One roster line on the snapshot.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterSnapshot {
    /// Display nickname.
    pub nickname: String,
    /// Role token (`spectator`, `all`, `team1`, `team12`, ...).
    pub role: String,
    /// Whether this participant holds host authority.
    pub is_host: bool,
    /// Lobby readiness flag.
    pub is_ready: bool,
}

/// Match result as exposed on the snapshot.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultSnapshot {
    /// Sets won by team 1.
    pub team1_score: u32,
    /// Sets won by team 2.
    pub team2_score: u32,
    /// One full phase log per completed set.
    pub results: Vec<Vec<String>>,
    /// Ordered keep/swap decisions taken between sets.
    pub side_choices: Vec<SideChoice>,
}

impl From<&GameResult> for ResultSnapshot {
    fn from(value: &GameResult) -> Self {
        Self {
            team1_score: value.team1_score,
            team2_score: value.team2_score,
            results: value.results.clone(),
            side_choices: value.side_choices.clone(),
        }
    }
}

/// Full externally visible view of a session.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Session code.
    pub code: String,
    /// Immutable settings.
    pub settings: SettingsSnapshot,
    /// Live draft status.
    pub status: StatusSnapshot,
    /// Participants in join order.
    pub roster: Vec<RosterSnapshot>,
    /// Match result, present once the first set has completed.
    pub result: Option<ResultSnapshot>,
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        Self {
            code: session.code.clone(),
            settings: (&session.settings).into(),
            status: (&session.status).into(),
            roster: session
                .roster
                .entries()
                .map(|entry| RosterSnapshot {
                    nickname: entry.nickname.clone(),
                    role: entry.role.to_string(),
                    is_host: entry.is_host,
                    is_ready: entry.is_ready,
                })
                .collect(),
            result: session.result.as_ref().map(Into::into),
        }
    }
}

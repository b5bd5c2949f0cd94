//! Domain state for a draft session: settings, live status, match result,
//! and the side/team/role vocabulary shared across the engine.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::state::roster::Roster;

/// Number of slots in the per-set phase log. Indices 1..=20 hold ban/pick
/// actions, index 21 holds the declared set winner, index 0 is unused.
pub const PHASE_DATA_SLOTS: usize = 22;

/// Visual side a team currently occupies. Distinct from team identity,
/// which is stable across a multi-set match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The blue side of the draft board.
    Blue,
    /// The red side of the draft board.
    Red,
}

impl Side {
    /// The complementary side.
    pub fn opposite(self) -> Side {
        match self {
            Side::Blue => Side::Red,
            Side::Red => Side::Blue,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Blue => write!(f, "blue"),
            Side::Red => write!(f, "red"),
        }
    }
}

/// Stable identity of a competing party across a multi-set match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// First team slot of the session.
    Team1,
    /// Second team slot of the session.
    Team2,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Team1 => write!(f, "team1"),
            Team::Team2 => write!(f, "team2"),
        }
    }
}

/// How many participants drive the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PlayerType {
    /// One participant controls both sides.
    #[serde(rename = "single")]
    Single,
    /// One participant per team.
    #[serde(rename = "1v1")]
    OneVsOne,
    /// Five seats per team, captain in seat 1.
    #[serde(rename = "5v5")]
    FiveVsFive,
}

/// Best-of-N match format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchFormat {
    /// Single set.
    Bo1,
    /// First team to two set wins.
    Bo3,
    /// First team to three set wins.
    Bo5,
}

impl MatchFormat {
    /// Set wins required to take the match.
    pub fn wins_needed(self) -> u32 {
        match self {
            MatchFormat::Bo1 => 1,
            MatchFormat::Bo3 => 2,
            MatchFormat::Bo5 => 3,
        }
    }
}

/// Draft ruleset variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum DraftType {
    /// Standard tournament draft, picks reset every set.
    Tournament,
    /// Champions picked in earlier sets are tracked for exclusion.
    HardFearless,
    /// Champions picked by a team are tracked for that team only.
    SoftFearless,
}

/// Host decision after a non-final set: keep the current sides or swap them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SideChoice {
    /// Teams stay on their current sides.
    Keep,
    /// Teams exchange sides for the next set.
    Swap,
}

/// A participant's assigned slot within a session.
///
/// Wire tokens: `spectator`, `all` (single), `team1`/`team2` (1v1), and
/// `team11`..`team15` / `team21`..`team25` (5v5 seat tokens).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Observer with no draft authority.
    Spectator,
    /// Single-player role controlling both sides.
    All,
    /// A team slot; `seat` is `None` for 1v1 and `Some(1..=5)` for 5v5.
    Team {
        /// Which team the slot belongs to.
        team: Team,
        /// Seat index within the team for 5v5 rosters.
        seat: Option<u8>,
    },
}

impl Role {
    /// The team component of this role, if any.
    pub fn team(&self) -> Option<Team> {
        match self {
            Role::Team { team, .. } => Some(*team),
            _ => None,
        }
    }

    /// Whether this role carries draft authority (i.e. is not a spectator).
    pub fn is_playing(&self) -> bool {
        !matches!(self, Role::Spectator)
    }

    /// Validate this role against the session's player type.
    pub fn is_valid_for(&self, player_type: PlayerType) -> bool {
        match (player_type, self) {
            (_, Role::Spectator) => true,
            (PlayerType::Single, Role::All) => true,
            (PlayerType::OneVsOne, Role::Team { seat: None, .. }) => true,
            (PlayerType::FiveVsFive, Role::Team { seat: Some(n), .. }) => (1..=5).contains(n),
            _ => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Spectator => write!(f, "spectator"),
            Role::All => write!(f, "all"),
            Role::Team { team, seat: None } => write!(f, "{team}"),
            Role::Team {
                team,
                seat: Some(n),
            } => write!(f, "{team}{n}"),
        }
    }
}

/// Error returned when a role token cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role token `{0}`")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spectator" => return Ok(Role::Spectator),
            "all" => return Ok(Role::All),
            "team1" => {
                return Ok(Role::Team {
                    team: Team::Team1,
                    seat: None,
                });
            }
            "team2" => {
                return Ok(Role::Team {
                    team: Team::Team2,
                    seat: None,
                });
            }
            _ => {}
        }

        let (team, seat) = s
            .strip_prefix("team1")
            .map(|rest| (Team::Team1, rest))
            .or_else(|| s.strip_prefix("team2").map(|rest| (Team::Team2, rest)))
            .ok_or_else(|| ParseRoleError(s.to_string()))?;
        let seat: u8 = seat.parse().map_err(|_| ParseRoleError(s.to_string()))?;
        if !(1..=5).contains(&seat) {
            return Err(ParseRoleError(s.to_string()));
        }
        Ok(Role::Team {
            team,
            seat: Some(seat),
        })
    }
}

/// Immutable settings fixed when a session is created.
#[derive(Debug, Clone)]
pub struct GameSettings {
    /// Engine-version tag reported by the creating client.
    pub version: String,
    /// Draft ruleset variant.
    pub draft_type: DraftType,
    /// Participant topology.
    pub player_type: PlayerType,
    /// Best-of-N format for the match.
    pub match_format: MatchFormat,
    /// Whether clients should render a per-turn timer (not enforced here).
    pub time_limit: bool,
    /// Champions banned globally for the whole match.
    pub global_bans: Vec<String>,
    /// Optional banner image reference for lobby display.
    pub banner_image: Option<String>,
    /// Display name of the session.
    pub name: String,
}

/// Live, mutable state of the draft. Mutated exclusively by the draft
/// state machine under the session lock.
#[derive(Debug, Clone)]
pub struct GameStatus {
    /// 0 = lobby, 1..=20 active ban/pick slots, 21 awaiting set result,
    /// 22 side choice, 23 match complete.
    pub phase: u8,
    /// Per-phase action log for the current set (see [`PHASE_DATA_SLOTS`]).
    pub phase_data: Vec<String>,
    /// 1-based set counter, incremented at each set boundary.
    pub set_number: u32,
    /// Side currently held by team 1.
    pub team1_side: Side,
    /// Side currently held by team 2. Always the complement of team 1's.
    pub team2_side: Side,
    /// Display name for team 1.
    pub team1_name: String,
    /// Display name for team 2.
    pub team2_name: String,
    /// Microseconds since the Unix epoch of the latest mutation.
    pub last_updated_at: i64,
    /// Champions picked in prior sets, per team. Tracked for fearless
    /// drafts; no exclusion rule is enforced server-side.
    pub previous_set_picks: HashMap<Team, Vec<String>>,
}

impl GameStatus {
    /// Fresh lobby status: phase 0, set 1, default sides, empty log.
    pub fn new(now: i64) -> Self {
        Self {
            phase: 0,
            phase_data: empty_phase_data(),
            set_number: 1,
            team1_side: Side::Blue,
            team2_side: Side::Red,
            team1_name: "Team 1".into(),
            team2_name: "Team 2".into(),
            last_updated_at: now,
            previous_set_picks: HashMap::new(),
        }
    }

    /// The team currently occupying `side`.
    pub fn team_on(&self, side: Side) -> Team {
        if self.team1_side == side {
            Team::Team1
        } else {
            Team::Team2
        }
    }

    /// Stamp the mutation timestamp, keeping it monotone non-decreasing.
    pub fn touch(&mut self, now: i64) {
        self.last_updated_at = self.last_updated_at.max(now);
    }
}

/// Accumulated match result. Created lazily on the first set completion
/// and mutated exclusively by the scorekeeper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameResult {
    /// Sets won by team 1.
    pub team1_score: u32,
    /// Sets won by team 2.
    pub team2_score: u32,
    /// One full phase-data copy per completed set, index-aligned with the
    /// set number.
    pub results: Vec<Vec<String>>,
    /// Ordered log of keep/swap decisions taken between sets.
    pub side_choices: Vec<SideChoice>,
}

/// Aggregate session state guarded by a single per-session lock.
#[derive(Debug)]
pub struct Session {
    /// Short code identifying the session.
    pub code: String,
    /// Microseconds since the Unix epoch at creation time.
    pub created_at: i64,
    /// Immutable settings.
    pub settings: GameSettings,
    /// Live draft status.
    pub status: GameStatus,
    /// Match result, present once the first set has completed.
    pub result: Option<GameResult>,
    /// Connected (or recently detached) participants.
    pub roster: Roster,
}

impl Session {
    /// Create a session in the lobby state with an empty roster.
    pub fn new(code: String, settings: GameSettings) -> Self {
        let now = now_micros();
        Self {
            code,
            created_at: now,
            settings,
            status: GameStatus::new(now),
            result: None,
            roster: Roster::default(),
        }
    }
}

/// A fresh all-empty phase log.
pub fn empty_phase_data() -> Vec<String> {
    vec![String::new(); PHASE_DATA_SLOTS]
}

/// Current wall-clock time in microseconds since the Unix epoch.
pub fn now_micros() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000) as i64
}

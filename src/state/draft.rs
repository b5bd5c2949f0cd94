//! The draft state machine and turn authorization engine.
//!
//! Phase layout for a set:
//!
//! ```text
//!   0          lobby, waiting for the host to start
//!   1..=20     active ban/pick slots (bans: 1-6 and 13-16)
//!   21         awaiting set-result confirmation from the host
//!   22         side-choice negotiation (non-final sets only)
//!   23         match complete
//! ```
//!
//! All operations validate first and apply only on success, so a failed
//! call never leaves the status half-mutated.

use thiserror::Error;

use crate::state::game::{GameStatus, PlayerType, Role, Side, Team, empty_phase_data};

/// Lobby phase, before the draft starts.
pub const PHASE_LOBBY: u8 = 0;
/// First active ban/pick phase.
pub const PHASE_FIRST_ACTIVE: u8 = 1;
/// Last active ban/pick phase.
pub const PHASE_LAST_ACTIVE: u8 = 20;
/// Awaiting the host's set-result confirmation.
pub const PHASE_AWAITING_RESULT: u8 = 21;
/// Awaiting the host's keep/swap side choice.
pub const PHASE_SIDE_CHOICE: u8 = 22;
/// Terminal phase, the match is decided.
pub const PHASE_MATCH_COMPLETE: u8 = 23;

/// Active phases whose turn belongs to whichever team currently sits blue.
/// The remaining active phases belong to the red side.
const BLUE_TURN_PHASES: [u8; 10] = [1, 3, 5, 7, 10, 11, 14, 16, 18, 19];

/// Ban phases within the active range; everything else in 1..=20 is a pick.
const BAN_PHASES: [u8; 10] = [1, 2, 3, 4, 5, 6, 13, 14, 15, 16];

/// Typed rejections raised by draft operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DraftError {
    /// Caller is not the session host.
    #[error("only the host may perform this action")]
    NotHost,
    /// Start was requested while the draft is already past the lobby.
    #[error("the draft has already started")]
    AlreadyStarted,
    /// Start was requested before every required slot was filled and ready.
    #[error("not all required participants are ready")]
    NotAllReady,
    /// Selection was attempted outside the active phase range.
    #[error("no selection is possible in the current phase")]
    InvalidPhase,
    /// The acting participant does not hold the turn for this phase.
    #[error("it is not your turn to act")]
    NotYourTurn,
    /// A pick phase was confirmed (or a selection submitted) without a champion.
    #[error("no champion selected for this phase")]
    MissingSelection,
    /// Confirm was requested after the final active phase.
    #[error("the draft for this set is complete")]
    DraftComplete,
    /// Set-result confirmation was requested outside phase 21.
    #[error("the session is not awaiting a set result")]
    NotAwaitingResult,
    /// Side choice was requested outside phase 22.
    #[error("the session is not in the side-choice phase")]
    NotSideChoicePhase,
}

/// Which side holds the turn in `phase`, if it is an active phase.
pub fn turn_side(phase: u8) -> Option<Side> {
    if !(PHASE_FIRST_ACTIVE..=PHASE_LAST_ACTIVE).contains(&phase) {
        return None;
    }
    if BLUE_TURN_PHASES.contains(&phase) {
        Some(Side::Blue)
    } else {
        Some(Side::Red)
    }
}

/// Whether `phase` is a ban slot. Ban phases may be confirmed with an
/// empty selection (a skipped ban); pick phases may not.
pub fn is_ban_phase(phase: u8) -> bool {
    BAN_PHASES.contains(&phase)
}

/// Seat index authorized to act in `phase` for 5v5 rosters.
///
/// Bans route to the captain (seat 1); picks follow the professional
/// draft order, pairing up through the seats.
fn required_seat(phase: u8) -> u8 {
    match phase {
        p if is_ban_phase(p) => 1,
        7 | 8 => 1,
        9 | 10 => 2,
        11 | 12 => 3,
        17 | 18 => 4,
        19 | 20 => 5,
        _ => unreachable!("phase {phase} is not an active phase"),
    }
}

/// Turn authorization: may a participant holding `role` act in `phase`?
///
/// Meta phases (lobby, set result, side choice, complete) are never
/// authorized here; they use separate host-only checks. Confirming a
/// phase is "acting", so confirm authorization reuses this function.
pub fn may_act(role: Role, phase: u8, player_type: PlayerType, team1_side: Side) -> bool {
    let Some(side) = turn_side(phase) else {
        return false;
    };
    let required_team = if team1_side == side {
        Team::Team1
    } else {
        Team::Team2
    };

    match (player_type, role) {
        (PlayerType::Single, Role::All) => true,
        (PlayerType::OneVsOne, Role::Team { team, seat: None }) => team == required_team,
        (PlayerType::FiveVsFive, Role::Team { team, seat: Some(seat) }) => {
            team == required_team && seat == required_seat(phase)
        }
        _ => false,
    }
}

/// Result of a successful phase confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseAdvance {
    /// The phase that was just confirmed.
    pub confirmed_phase: u8,
    /// The action recorded in the confirmed slot (empty for a skipped ban).
    pub confirmed_action: String,
    /// The phase the draft advanced to.
    pub new_phase: u8,
}

/// Start the draft: host-only, lobby-only, all required slots ready.
///
/// `all_ready` is the roster's verdict for the session's player type;
/// single-player sessions report `true` unconditionally.
pub fn start_draft(
    status: &mut GameStatus,
    is_host: bool,
    all_ready: bool,
    now: i64,
) -> Result<(), DraftError> {
    if !is_host {
        return Err(DraftError::NotHost);
    }
    if status.phase != PHASE_LOBBY {
        return Err(DraftError::AlreadyStarted);
    }
    if !all_ready {
        return Err(DraftError::NotAllReady);
    }

    status.phase = PHASE_FIRST_ACTIVE;
    status.touch(now);
    Ok(())
}

/// Record a champion selection into the current phase slot without
/// advancing the phase.
pub fn select_champion(
    status: &mut GameStatus,
    role: Role,
    player_type: PlayerType,
    champion: &str,
    now: i64,
) -> Result<(), DraftError> {
    if turn_side(status.phase).is_none() {
        return Err(DraftError::InvalidPhase);
    }
    if !may_act(role, status.phase, player_type, status.team1_side) {
        return Err(DraftError::NotYourTurn);
    }
    if champion.is_empty() {
        return Err(DraftError::MissingSelection);
    }

    status.phase_data[status.phase as usize] = champion.to_string();
    status.touch(now);
    Ok(())
}

/// Confirm the current phase and advance by exactly one.
///
/// Pick phases require a prior selection; ban phases may advance with an
/// empty slot. Phase 20 advances into the awaiting-result meta phase.
pub fn confirm_phase(
    status: &mut GameStatus,
    role: Role,
    player_type: PlayerType,
    now: i64,
) -> Result<PhaseAdvance, DraftError> {
    if status.phase >= PHASE_AWAITING_RESULT {
        return Err(DraftError::DraftComplete);
    }
    if !may_act(role, status.phase, player_type, status.team1_side) {
        return Err(DraftError::NotYourTurn);
    }
    let confirmed_action = status.phase_data[status.phase as usize].clone();
    if !is_ban_phase(status.phase) && confirmed_action.is_empty() {
        return Err(DraftError::MissingSelection);
    }

    let confirmed_phase = status.phase;
    status.phase += 1;
    status.touch(now);
    Ok(PhaseAdvance {
        confirmed_phase,
        confirmed_action,
        new_phase: status.phase,
    })
}

/// Record the declared set winner into the phase log and move to the
/// post-result phase decided by the scorekeeper.
///
/// The caller resolves scoring separately; this only validates the phase
/// gate and applies the phase jump (21 -> 22 continuing, 21 -> 23 final).
pub fn apply_set_result(
    status: &mut GameStatus,
    is_host: bool,
    winner_side: Side,
    is_final: bool,
    now: i64,
) -> Result<(), DraftError> {
    if !is_host {
        return Err(DraftError::NotHost);
    }
    if status.phase != PHASE_AWAITING_RESULT {
        return Err(DraftError::NotAwaitingResult);
    }

    status.phase_data[PHASE_AWAITING_RESULT as usize] = winner_side.to_string();
    status.phase = if is_final {
        PHASE_MATCH_COMPLETE
    } else {
        PHASE_SIDE_CHOICE
    };
    status.touch(now);
    Ok(())
}

/// Champions picked in the just-completed set, grouped by the team that
/// picked them. Fed into `previous_set_picks` for fearless drafts.
pub fn set_picks_by_team(status: &GameStatus) -> Vec<(Team, String)> {
    (PHASE_FIRST_ACTIVE..=PHASE_LAST_ACTIVE)
        .filter(|&phase| !is_ban_phase(phase))
        .filter_map(|phase| {
            let pick = &status.phase_data[phase as usize];
            if pick.is_empty() {
                return None;
            }
            let side = turn_side(phase)?;
            Some((status.team_on(side), pick.clone()))
        })
        .collect()
}

/// Apply the host's keep/swap decision and roll the session into the next
/// set: sides updated, phase log cleared, set number bumped, back to lobby.
pub fn apply_side_choice(
    status: &mut GameStatus,
    is_host: bool,
    swap: bool,
    now: i64,
) -> Result<(), DraftError> {
    if !is_host {
        return Err(DraftError::NotHost);
    }
    if status.phase != PHASE_SIDE_CHOICE {
        return Err(DraftError::NotSideChoicePhase);
    }

    if swap {
        std::mem::swap(&mut status.team1_side, &mut status.team2_side);
    }
    status.phase_data = empty_phase_data();
    status.set_number += 1;
    status.phase = PHASE_LOBBY;
    status.touch(now);
    Ok(())
}

//! Session roster: participants keyed by a stable identity token.
//!
//! The roster deliberately separates participant identity from the
//! transport connection. Entries are keyed by a participant token that
//! survives reconnects; the WebSocket connection id is re-attached when a
//! client comes back, so role, ready flag, and host authority persist
//! across a transport-level drop.

use indexmap::IndexMap;
use thiserror::Error;
use uuid::Uuid;

use crate::state::game::{PlayerType, Role, Team};

/// Typed rejections raised by roster operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// The requested role is not valid for the session's player type.
    #[error("role `{0}` is not valid for this session")]
    InvalidRole(String),
    /// The requested role is already held by another participant.
    #[error("role `{0}` is already taken")]
    RoleTaken(String),
    /// The acting participant has no roster entry in this session.
    #[error("participant is not part of this session")]
    UnknownParticipant,
}

/// One participant of a session.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    /// Stable identity token, generated on first join.
    pub token: String,
    /// Transport connection currently attached, if any.
    pub connection_id: Option<Uuid>,
    /// Display nickname.
    pub nickname: String,
    /// Assigned slot.
    pub role: Role,
    /// Host authority: start the draft, confirm results, choose sides.
    pub is_host: bool,
    /// Lobby readiness flag.
    pub is_ready: bool,
    /// Champion the participant is hovering before confirming, if any.
    pub selected_champion: Option<String>,
    /// Microseconds since the Unix epoch when the participant first joined.
    pub joined_at: i64,
}

impl RosterEntry {
    /// Whether a transport connection is currently attached.
    pub fn is_connected(&self) -> bool {
        self.connection_id.is_some()
    }
}

/// Outcome of a join call: the resulting entry plus whether this was a
/// reconnect of a known participant.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// The entry after the join was applied.
    pub entry: RosterEntry,
    /// True when an existing participant re-attached a new connection.
    pub rejoined: bool,
}

/// Join-order-preserving set of participants for one session.
#[derive(Debug, Default)]
pub struct Roster {
    entries: IndexMap<String, RosterEntry>,
}

impl Roster {
    /// Add a participant, or re-attach a known one.
    ///
    /// A token already present in the roster is treated as a reconnect:
    /// the new connection id is attached and the nickname refreshed, while
    /// role, ready flag, and host authority are preserved (the requested
    /// role is ignored on this path). New participants get host authority
    /// iff the roster is empty.
    pub fn join(
        &mut self,
        token: String,
        connection_id: Uuid,
        nickname: String,
        requested_role: Role,
        player_type: PlayerType,
        now: i64,
    ) -> Result<JoinOutcome, RosterError> {
        if let Some(entry) = self.entries.get_mut(&token) {
            entry.connection_id = Some(connection_id);
            entry.nickname = nickname;
            return Ok(JoinOutcome {
                entry: entry.clone(),
                rejoined: true,
            });
        }

        self.ensure_assignable(&token, requested_role, player_type)?;

        let entry = RosterEntry {
            token: token.clone(),
            connection_id: Some(connection_id),
            nickname,
            role: requested_role,
            is_host: self.entries.is_empty(),
            is_ready: false,
            selected_champion: None,
            joined_at: now,
        };
        self.entries.insert(token, entry.clone());
        Ok(JoinOutcome {
            entry,
            rejoined: false,
        })
    }

    /// Move a participant to a different role.
    ///
    /// Changing role drops the ready flag; a stale "ready" from the old
    /// slot must not count towards the new one.
    pub fn change_role(
        &mut self,
        token: &str,
        new_role: Role,
        player_type: PlayerType,
    ) -> Result<&RosterEntry, RosterError> {
        self.ensure_assignable(token, new_role, player_type)?;
        let entry = self
            .entries
            .get_mut(token)
            .ok_or(RosterError::UnknownParticipant)?;
        entry.role = new_role;
        entry.is_ready = false;
        Ok(entry)
    }

    /// Set a participant's ready flag. Idempotent.
    pub fn set_ready(&mut self, token: &str, ready: bool) -> Result<&RosterEntry, RosterError> {
        let entry = self
            .entries
            .get_mut(token)
            .ok_or(RosterError::UnknownParticipant)?;
        entry.is_ready = ready;
        Ok(entry)
    }

    /// Record the champion a participant is hovering.
    pub fn set_selected_champion(&mut self, token: &str, champion: Option<String>) {
        if let Some(entry) = self.entries.get_mut(token) {
            entry.selected_champion = champion;
        }
    }

    /// Remove a participant entirely (explicit leave).
    pub fn remove(&mut self, token: &str) -> Option<RosterEntry> {
        self.entries.shift_remove(token)
    }

    /// Detach the transport connection from whichever entry holds it,
    /// keeping the entry (and its role/host/ready state) for a reconnect.
    pub fn detach(&mut self, connection_id: Uuid) -> Option<RosterEntry> {
        let entry = self
            .entries
            .values_mut()
            .find(|entry| entry.connection_id == Some(connection_id))?;
        entry.connection_id = None;
        Some(entry.clone())
    }

    /// Give host authority to the earliest-joined connected participant,
    /// if nobody currently holds it. Returns the promoted entry.
    pub fn reassign_host(&mut self) -> Option<RosterEntry> {
        if self.entries.values().any(|entry| entry.is_host && entry.is_connected()) {
            return None;
        }
        for entry in self.entries.values_mut() {
            entry.is_host = false;
        }
        let entry = self.entries.values_mut().find(|entry| entry.is_connected())?;
        entry.is_host = true;
        Some(entry.clone())
    }

    /// Look up a participant by token.
    pub fn get(&self, token: &str) -> Option<&RosterEntry> {
        self.entries.get(token)
    }

    /// Look up the participant attached to a connection.
    pub fn by_connection(&self, connection_id: Uuid) -> Option<&RosterEntry> {
        self.entries
            .values()
            .find(|entry| entry.connection_id == Some(connection_id))
    }

    /// All entries in join order.
    pub fn entries(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.values()
    }

    /// Connection ids of every attached participant (broadcast targets).
    pub fn connection_ids(&self) -> Vec<Uuid> {
        self.entries
            .values()
            .filter_map(|entry| entry.connection_id)
            .collect()
    }

    /// Whether every role slot the player type requires is filled and ready.
    ///
    /// Single-player sessions have no readiness requirement. 1v1 requires
    /// both team slots; 5v5 requires all ten seats.
    pub fn all_required_ready(&self, player_type: PlayerType) -> bool {
        let required: Vec<Role> = match player_type {
            PlayerType::Single => return true,
            PlayerType::OneVsOne => [Team::Team1, Team::Team2]
                .into_iter()
                .map(|team| Role::Team { team, seat: None })
                .collect(),
            PlayerType::FiveVsFive => [Team::Team1, Team::Team2]
                .into_iter()
                .flat_map(|team| (1..=5).map(move |seat| Role::Team { team, seat: Some(seat) }))
                .collect(),
        };
        required.into_iter().all(|role| {
            self.entries
                .values()
                .any(|entry| entry.role == role && entry.is_ready)
        })
    }

    /// Clear every non-spectator ready flag (next-set reset).
    pub fn reset_ready(&mut self) {
        for entry in self.entries.values_mut() {
            if entry.role.is_playing() {
                entry.is_ready = false;
            }
        }
    }

    /// Number of roster entries, connected or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the roster has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_assignable(
        &self,
        token: &str,
        role: Role,
        player_type: PlayerType,
    ) -> Result<(), RosterError> {
        if !role.is_valid_for(player_type) {
            return Err(RosterError::InvalidRole(role.to_string()));
        }
        if role.is_playing() {
            let taken = self
                .entries
                .values()
                .any(|entry| entry.token != token && entry.role == role);
            if taken {
                return Err(RosterError::RoleTaken(role.to_string()));
            }
        }
        Ok(())
    }
}

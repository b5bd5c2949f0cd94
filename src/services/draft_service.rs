//! Draft progression: start, selections, confirms, set results, and the
//! side choice between sets.
//!
//! Each operation resolves the actor from its participant token, holds the
//! session lock for the whole validate-then-apply span, and broadcasts
//! exactly one event on success.

use tracing::info;

use crate::{
    dto::events::{
        ChampionSelectedEvent, DraftStartedEvent, MatchFinishedEvent, NextSetStartedEvent,
        PhaseProgressedEvent, SideChoicePhaseEvent,
    },
    error::ServiceError,
    services::events,
    state::{
        SharedState, draft,
        game::{DraftType, Session, Side, SideChoice, now_micros},
        roster::RosterEntry,
        score,
    },
};

/// Start the draft: host-only, lobby-only, every required slot ready.
pub async fn start_draft(
    state: &SharedState,
    game_code: &str,
    token: &str,
) -> Result<(), ServiceError> {
    let handle = state.session(game_code)?;
    let mut session = handle.lock().await;
    let entry = actor(&session, token)?;

    let player_type = session.settings.player_type;
    let all_ready = session.roster.all_required_ready(player_type);
    let now = now_micros();
    draft::start_draft(&mut session.status, entry.is_host, all_ready, now)?;

    info!(code = %session.code, set = session.status.set_number, "draft started");
    events::broadcast_draft_started(
        state,
        &session.roster.connection_ids(),
        &DraftStartedEvent {
            nickname: entry.nickname,
            phase: session.status.phase,
            set_number: session.status.set_number,
            timestamp: now,
        },
    );
    Ok(())
}

/// Record a champion into the current phase slot without advancing.
pub async fn select_champion(
    state: &SharedState,
    game_code: &str,
    token: &str,
    champion: &str,
) -> Result<(), ServiceError> {
    let handle = state.session(game_code)?;
    let mut session = handle.lock().await;
    let entry = actor(&session, token)?;

    let player_type = session.settings.player_type;
    let now = now_micros();
    draft::select_champion(&mut session.status, entry.role, player_type, champion, now)?;
    session
        .roster
        .set_selected_champion(token, Some(champion.to_string()));

    events::broadcast_champion_selected(
        state,
        &session.roster.connection_ids(),
        &ChampionSelectedEvent {
            nickname: entry.nickname,
            role: entry.role.to_string(),
            phase: session.status.phase,
            champion: champion.to_string(),
            timestamp: now,
        },
    );
    Ok(())
}

/// Lock in the current phase's action and advance the draft by one.
pub async fn confirm_phase(
    state: &SharedState,
    game_code: &str,
    token: &str,
) -> Result<(), ServiceError> {
    let handle = state.session(game_code)?;
    let mut session = handle.lock().await;
    let entry = actor(&session, token)?;

    let player_type = session.settings.player_type;
    let now = now_micros();
    let advance = draft::confirm_phase(&mut session.status, entry.role, player_type, now)?;
    session.roster.set_selected_champion(token, None);

    events::broadcast_phase_progressed(
        state,
        &session.roster.connection_ids(),
        &PhaseProgressedEvent {
            nickname: entry.nickname,
            confirmed_phase: advance.confirmed_phase,
            confirmed_action: advance.confirmed_action,
            new_phase: advance.new_phase,
            timestamp: now,
        },
    );
    Ok(())
}

/// Declare the winner of the finished set (host only).
///
/// Folds the set into the match result, tracks picks for fearless drafts,
/// and routes the session to side choice or match completion.
pub async fn confirm_result(
    state: &SharedState,
    game_code: &str,
    token: &str,
    winner: &str,
) -> Result<(), ServiceError> {
    let winner_side = parse_winner(winner)?;

    let handle = state.session(game_code)?;
    let mut session = handle.lock().await;
    let entry = actor(&session, token)?;

    let mut set_log = session.status.phase_data.clone();
    set_log[draft::PHASE_AWAITING_RESULT as usize] = winner_side.to_string();
    let (result, is_final) = score::record_set_winner(
        session.result.clone().unwrap_or_default(),
        winner_side,
        session.status.team1_side,
        session.status.set_number,
        set_log,
        session.settings.match_format,
    );

    let now = now_micros();
    draft::apply_set_result(&mut session.status, entry.is_host, winner_side, is_final, now)?;

    if session.settings.draft_type == DraftType::HardFearless {
        let picks = draft::set_picks_by_team(&session.status);
        for (team, pick) in picks {
            session
                .status
                .previous_set_picks
                .entry(team)
                .or_default()
                .push(pick);
        }
    }

    let winner_team = session.status.team_on(winner_side);
    let (team1_score, team2_score) = (result.team1_score, result.team2_score);
    session.result = Some(result);

    info!(
        code = %session.code,
        winner = %winner_side,
        team1_score,
        team2_score,
        is_final,
        "set result confirmed"
    );

    let targets = session.roster.connection_ids();
    if is_final {
        events::broadcast_match_finished(
            state,
            &targets,
            &MatchFinishedEvent {
                winner_side: winner_side.to_string(),
                winner_team: winner_team.to_string(),
                team1_score,
                team2_score,
                timestamp: now,
            },
        );
    } else {
        events::broadcast_side_choice_phase(
            state,
            &targets,
            &SideChoicePhaseEvent {
                winner_side: winner_side.to_string(),
                team1_score,
                team2_score,
                set_number: session.status.set_number,
                timestamp: now,
            },
        );
    }
    Ok(())
}

/// Keep or swap sides for the next set (host only) and reopen the lobby.
pub async fn choose_side(
    state: &SharedState,
    game_code: &str,
    token: &str,
    choice: &str,
) -> Result<(), ServiceError> {
    let choice = parse_choice(choice)?;

    let handle = state.session(game_code)?;
    let mut session = handle.lock().await;
    let entry = actor(&session, token)?;

    let now = now_micros();
    draft::apply_side_choice(
        &mut session.status,
        entry.is_host,
        choice == SideChoice::Swap,
        now,
    )?;
    session
        .result
        .get_or_insert_with(Default::default)
        .side_choices
        .push(choice);
    session.roster.reset_ready();

    info!(
        code = %session.code,
        set = session.status.set_number,
        ?choice,
        "next set opened"
    );

    events::broadcast_next_set_started(
        state,
        &session.roster.connection_ids(),
        &NextSetStartedEvent {
            set_number: session.status.set_number,
            team1_side: session.status.team1_side.to_string(),
            team2_side: session.status.team2_side.to_string(),
            side_choice: choice,
            timestamp: now,
        },
    );
    Ok(())
}

fn actor(session: &Session, token: &str) -> Result<RosterEntry, ServiceError> {
    session
        .roster
        .get(token)
        .cloned()
        .ok_or(ServiceError::NotJoined)
}

fn parse_winner(winner: &str) -> Result<Side, ServiceError> {
    match winner {
        "blue" => Ok(Side::Blue),
        "red" => Ok(Side::Red),
        other => Err(ServiceError::InvalidWinner(other.to_string())),
    }
}

fn parse_choice(choice: &str) -> Result<SideChoice, ServiceError> {
    match choice {
        "keep" => Ok(SideChoice::Keep),
        "swap" => Ok(SideChoice::Swap),
        other => Err(ServiceError::InvalidChoice(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::{
        config::AppConfig,
        dto::game::CreateGameRequest,
        services::{game_service, roster_service},
        state::AppState,
    };

    struct Fixture {
        state: SharedState,
        code: String,
        alice: String, // team1, host
        bob: String,   // team2
    }

    async fn fixture(match_format: &str, draft_type: &str) -> Fixture {
        let state = AppState::new(AppConfig::default());
        let request: CreateGameRequest = serde_json::from_str(&format!(
            r#"{{
                "version": "1",
                "draftType": "{draft_type}",
                "playerType": "1v1",
                "matchFormat": "{match_format}",
                "timeLimit": false,
                "name": "finals"
            }}"#
        ))
        .unwrap();
        let code = game_service::create_session(&state, request)
            .unwrap()
            .game_code;

        let alice = roster_service::join(&state, Uuid::new_v4(), &code, "alice", Some("team1"), None)
            .await
            .unwrap()
            .token;
        let bob = roster_service::join(&state, Uuid::new_v4(), &code, "bob", Some("team2"), None)
            .await
            .unwrap()
            .token;
        roster_service::set_ready(&state, &code, &alice, true)
            .await
            .unwrap();
        roster_service::set_ready(&state, &code, &bob, true)
            .await
            .unwrap();

        Fixture {
            state,
            code,
            alice,
            bob,
        }
    }

    /// Token of the participant who holds the turn in the current phase.
    async fn on_turn(fx: &Fixture) -> String {
        let handle = fx.state.session(&fx.code).unwrap();
        let session = handle.lock().await;
        let side = draft::turn_side(session.status.phase).expect("active phase");
        if session.status.team1_side == side {
            fx.alice.clone()
        } else {
            fx.bob.clone()
        }
    }

    async fn current_phase(fx: &Fixture) -> u8 {
        let handle = fx.state.session(&fx.code).unwrap();
        let session = handle.lock().await;
        session.status.phase
    }

    /// Drive one full set: picks are selected, bans are skipped.
    async fn drive_set(fx: &Fixture) {
        while current_phase(fx).await <= draft::PHASE_LAST_ACTIVE {
            let phase = current_phase(fx).await;
            let token = on_turn(fx).await;
            if !draft::is_ban_phase(phase) {
                select_champion(&fx.state, &fx.code, &token, &format!("champ{phase}"))
                    .await
                    .unwrap();
            }
            confirm_phase(&fx.state, &fx.code, &token).await.unwrap();
        }
    }

    async fn ready_both(fx: &Fixture) {
        roster_service::set_ready(&fx.state, &fx.code, &fx.alice, true)
            .await
            .unwrap();
        roster_service::set_ready(&fx.state, &fx.code, &fx.bob, true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn bo1_runs_start_to_match_complete() {
        let fx = fixture("bo1", "tournament").await;

        start_draft(&fx.state, &fx.code, &fx.alice).await.unwrap();
        assert_eq!(current_phase(&fx).await, draft::PHASE_FIRST_ACTIVE);

        drive_set(&fx).await;
        assert_eq!(current_phase(&fx).await, draft::PHASE_AWAITING_RESULT);

        confirm_result(&fx.state, &fx.code, &fx.alice, "blue")
            .await
            .unwrap();
        assert_eq!(current_phase(&fx).await, draft::PHASE_MATCH_COMPLETE);

        let snapshot = game_service::snapshot(&fx.state, &fx.code).await.unwrap();
        let result = snapshot.result.expect("match result present");
        assert_eq!((result.team1_score, result.team2_score), (1, 0));
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0][7], "champ7");
        assert_eq!(result.results[0][21], "blue");
        // Bans were skipped and stay empty in the archived log.
        assert_eq!(result.results[0][1], "");
    }

    #[tokio::test]
    async fn start_preconditions_are_enforced() {
        let fx = fixture("bo1", "tournament").await;

        let err = start_draft(&fx.state, &fx.code, &fx.bob).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotHost));

        roster_service::set_ready(&fx.state, &fx.code, &fx.bob, false)
            .await
            .unwrap();
        let err = start_draft(&fx.state, &fx.code, &fx.alice)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotAllReady));

        roster_service::set_ready(&fx.state, &fx.code, &fx.bob, true)
            .await
            .unwrap();
        start_draft(&fx.state, &fx.code, &fx.alice).await.unwrap();
        let err = start_draft(&fx.state, &fx.code, &fx.alice)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyStarted));
    }

    #[tokio::test]
    async fn wrong_actor_is_turned_away() {
        let fx = fixture("bo1", "tournament").await;
        start_draft(&fx.state, &fx.code, &fx.alice).await.unwrap();

        // Phase 1 belongs to blue (team1 = alice); bob may not act.
        let err = select_champion(&fx.state, &fx.code, &fx.bob, "ahri")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotYourTurn));
        let err = confirm_phase(&fx.state, &fx.code, &fx.bob).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotYourTurn));

        // A stranger's token is rejected before any turn logic runs.
        let err = confirm_phase(&fx.state, &fx.code, "nobody").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotJoined));
    }

    #[tokio::test]
    async fn result_and_side_choice_are_phase_gated() {
        let fx = fixture("bo3", "tournament").await;

        let err = confirm_result(&fx.state, &fx.code, &fx.alice, "blue")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotAwaitingResult));
        let err = choose_side(&fx.state, &fx.code, &fx.alice, "swap")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotSideChoicePhase));

        start_draft(&fx.state, &fx.code, &fx.alice).await.unwrap();
        drive_set(&fx).await;

        let err = confirm_result(&fx.state, &fx.code, &fx.alice, "green")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidWinner(_)));
        let err = confirm_result(&fx.state, &fx.code, &fx.bob, "blue")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotHost));

        confirm_result(&fx.state, &fx.code, &fx.alice, "blue")
            .await
            .unwrap();
        let err = choose_side(&fx.state, &fx.code, &fx.alice, "sideways")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidChoice(_)));
        let err = choose_side(&fx.state, &fx.code, &fx.bob, "swap")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotHost));
    }

    #[tokio::test]
    async fn bo3_with_swap_flips_sides_and_routes_turns() {
        let fx = fixture("bo3", "tournament").await;
        start_draft(&fx.state, &fx.code, &fx.alice).await.unwrap();
        drive_set(&fx).await;

        // Set 1: blue (alice) wins. Non-final, so side choice opens.
        confirm_result(&fx.state, &fx.code, &fx.alice, "blue")
            .await
            .unwrap();
        assert_eq!(current_phase(&fx).await, draft::PHASE_SIDE_CHOICE);

        choose_side(&fx.state, &fx.code, &fx.alice, "swap")
            .await
            .unwrap();
        let snapshot = game_service::snapshot(&fx.state, &fx.code).await.unwrap();
        assert_eq!(snapshot.status.phase, 0);
        assert_eq!(snapshot.status.set_number, 2);
        assert_eq!(snapshot.status.team1_side, "red");
        assert_eq!(snapshot.status.team2_side, "blue");
        assert!(snapshot.status.phase_data.iter().all(String::is_empty));
        // Ready flags were cleared for the new lobby.
        assert!(snapshot.roster.iter().all(|p| !p.is_ready));

        // After the swap, phase 1 (blue turn) belongs to bob.
        ready_both(&fx).await;
        start_draft(&fx.state, &fx.code, &fx.alice).await.unwrap();
        assert_eq!(on_turn(&fx).await, fx.bob);
        drive_set(&fx).await;

        // Set 2: blue wins again, but blue is now team2 -> scores level.
        confirm_result(&fx.state, &fx.code, &fx.alice, "blue")
            .await
            .unwrap();
        assert_eq!(current_phase(&fx).await, draft::PHASE_SIDE_CHOICE);

        choose_side(&fx.state, &fx.code, &fx.alice, "keep")
            .await
            .unwrap();
        ready_both(&fx).await;
        start_draft(&fx.state, &fx.code, &fx.alice).await.unwrap();
        drive_set(&fx).await;

        // Set 3: red wins; team1 sits red, so alice takes the match 2-1.
        confirm_result(&fx.state, &fx.code, &fx.alice, "red")
            .await
            .unwrap();
        assert_eq!(current_phase(&fx).await, draft::PHASE_MATCH_COMPLETE);

        let snapshot = game_service::snapshot(&fx.state, &fx.code).await.unwrap();
        let result = snapshot.result.expect("match result present");
        assert_eq!((result.team1_score, result.team2_score), (2, 1));
        assert_eq!(result.results.len(), 3);
        assert_eq!(
            result.side_choices,
            vec![SideChoice::Swap, SideChoice::Keep]
        );
    }

    #[tokio::test]
    async fn hard_fearless_tracks_previous_set_picks() {
        let fx = fixture("bo3", "hardFearless").await;
        start_draft(&fx.state, &fx.code, &fx.alice).await.unwrap();
        drive_set(&fx).await;
        confirm_result(&fx.state, &fx.code, &fx.alice, "blue")
            .await
            .unwrap();

        let snapshot = game_service::snapshot(&fx.state, &fx.code).await.unwrap();
        let team1_picks = &snapshot.status.previous_set_picks["team1"];
        let team2_picks = &snapshot.status.previous_set_picks["team2"];
        // Ten picks total, split by the team that made them.
        assert_eq!(team1_picks.len() + team2_picks.len(), 10);
        assert!(team1_picks.contains(&"champ7".to_string()));
        assert!(team2_picks.contains(&"champ8".to_string()));
    }

    #[tokio::test]
    async fn session_survives_after_all_participants_leave() {
        let fx = fixture("bo3", "tournament").await;
        start_draft(&fx.state, &fx.code, &fx.alice).await.unwrap();
        assert_eq!(current_phase(&fx).await, draft::PHASE_FIRST_ACTIVE);

        // Everyone walks out mid-draft; the session must stay addressable
        // with its settings and status intact.
        roster_service::leave(&fx.state, &fx.code, &fx.alice)
            .await
            .unwrap();
        roster_service::leave(&fx.state, &fx.code, &fx.bob)
            .await
            .unwrap();

        let snapshot = game_service::snapshot(&fx.state, &fx.code).await.unwrap();
        assert_eq!(snapshot.code, fx.code);
        assert_eq!(snapshot.status.phase, draft::PHASE_FIRST_ACTIVE);
        assert_eq!(snapshot.settings.name, "finals");
        assert!(snapshot.roster.is_empty());
    }

    #[tokio::test]
    async fn start_and_progress_frames_carry_the_actor() {
        let fx = fixture("bo1", "tournament").await;

        // Attach a captured channel so alice's frames can be inspected.
        let alice_conn = Uuid::new_v4();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        fx.state.connections().insert(
            alice_conn,
            crate::state::ClientConnection {
                id: alice_conn,
                tx,
            },
        );
        roster_service::join(
            &fx.state,
            alice_conn,
            &fx.code,
            "alice",
            None,
            Some(fx.alice.clone()),
        )
        .await
        .unwrap();

        start_draft(&fx.state, &fx.code, &fx.alice).await.unwrap();
        confirm_phase(&fx.state, &fx.code, &fx.alice).await.unwrap();

        let mut frames = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let axum::extract::ws::Message::Text(text) = message {
                frames.push(serde_json::from_str::<serde_json::Value>(text.as_str()).unwrap());
            }
        }

        let started = frames
            .iter()
            .find(|frame| frame["event"] == "draft_started")
            .expect("draft_started frame");
        assert_eq!(started["data"]["nickname"], "alice");
        assert_eq!(started["data"]["phase"], 1);

        let progressed = frames
            .iter()
            .find(|frame| frame["event"] == "phase_progressed")
            .expect("phase_progressed frame");
        assert_eq!(progressed["data"]["nickname"], "alice");
        assert_eq!(progressed["data"]["confirmedPhase"], 1);
        assert_eq!(progressed["data"]["newPhase"], 2);
    }

    #[tokio::test]
    async fn racing_confirms_resolve_to_one_success() {
        let fx = fixture("bo1", "tournament").await;
        start_draft(&fx.state, &fx.code, &fx.alice).await.unwrap();

        // Phase 1 is a skippable ban held by alice. Two racing confirms:
        // the first advances to phase 2 (red's turn), the second must be
        // turned away instead of double-advancing.
        let first = confirm_phase(&fx.state, &fx.code, &fx.alice);
        let second = confirm_phase(&fx.state, &fx.code, &fx.alice);
        let (first, second) = tokio::join!(first, second);

        assert_eq!(
            [&first, &second].iter().filter(|r| r.is_ok()).count(),
            1,
            "exactly one confirm may win: {first:?} / {second:?}"
        );
        assert_eq!(current_phase(&fx).await, 2);
    }
}

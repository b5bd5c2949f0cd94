//! Match scorekeeping: pure win/continue resolution at set boundaries.

use crate::state::game::{GameResult, MatchFormat, Side, Team, empty_phase_data};

/// Fold a completed set into the match result.
///
/// Resolves which team currently holds `winner_side`, credits it one set
/// win, and appends the set's full phase log to `results`, padding with
/// empty sets so the log stays index-aligned with the set number. Returns
/// the updated result together with whether the match is now decided.
///
/// Pure function: no I/O, no side effects beyond the returned value.
pub fn record_set_winner(
    mut result: GameResult,
    winner_side: Side,
    team1_side: Side,
    set_number: u32,
    set_log: Vec<String>,
    format: MatchFormat,
) -> (GameResult, bool) {
    let winner = if team1_side == winner_side {
        Team::Team1
    } else {
        Team::Team2
    };
    match winner {
        Team::Team1 => result.team1_score += 1,
        Team::Team2 => result.team2_score += 1,
    }

    let slot = set_number.saturating_sub(1) as usize;
    while result.results.len() < slot {
        result.results.push(empty_phase_data());
    }
    result.results.push(set_log);

    let needed = format.wins_needed();
    let is_final = result.team1_score >= needed || result.team2_score >= needed;
    (result, is_final)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(tag: &str) -> Vec<String> {
        vec![tag.to_string()]
    }

    #[test]
    fn winner_resolved_through_current_sides() {
        let (result, _) = record_set_winner(
            GameResult::default(),
            Side::Blue,
            Side::Blue,
            1,
            log("a"),
            MatchFormat::Bo3,
        );
        assert_eq!((result.team1_score, result.team2_score), (1, 0));

        // Same winning side, but team1 now sits red: team2 takes the set.
        let (result, _) = record_set_winner(
            GameResult::default(),
            Side::Blue,
            Side::Red,
            1,
            log("a"),
            MatchFormat::Bo3,
        );
        assert_eq!((result.team1_score, result.team2_score), (0, 1));
    }

    #[test]
    fn bo1_is_always_final() {
        let (_, is_final) = record_set_winner(
            GameResult::default(),
            Side::Red,
            Side::Blue,
            1,
            log("a"),
            MatchFormat::Bo1,
        );
        assert!(is_final);
    }

    #[test]
    fn bo3_decision_table() {
        // 1-0 -> not final.
        let (result, is_final) = record_set_winner(
            GameResult::default(),
            Side::Blue,
            Side::Blue,
            1,
            log("a"),
            MatchFormat::Bo3,
        );
        assert!(!is_final);

        // 1-1 -> not final.
        let (result, is_final) = record_set_winner(
            result,
            Side::Blue,
            Side::Red,
            2,
            log("b"),
            MatchFormat::Bo3,
        );
        assert_eq!((result.team1_score, result.team2_score), (1, 1));
        assert!(!is_final);

        // 2-1 -> final.
        let (result, is_final) = record_set_winner(
            result,
            Side::Blue,
            Side::Blue,
            3,
            log("c"),
            MatchFormat::Bo3,
        );
        assert_eq!((result.team1_score, result.team2_score), (2, 1));
        assert!(is_final);
    }

    #[test]
    fn bo3_two_zero_is_final() {
        let (result, _) = record_set_winner(
            GameResult::default(),
            Side::Blue,
            Side::Blue,
            1,
            log("a"),
            MatchFormat::Bo3,
        );
        let (result, is_final) = record_set_winner(
            result,
            Side::Blue,
            Side::Blue,
            2,
            log("b"),
            MatchFormat::Bo3,
        );
        assert_eq!((result.team1_score, result.team2_score), (2, 0));
        assert!(is_final);
    }

    #[test]
    fn bo5_decision_table() {
        let mut result = GameResult {
            team1_score: 2,
            team2_score: 1,
            ..GameResult::default()
        };
        // 2-1 going in: another team2 win makes 2-2, not final.
        let (next, is_final) = record_set_winner(
            result.clone(),
            Side::Red,
            Side::Blue,
            4,
            log("d"),
            MatchFormat::Bo5,
        );
        assert_eq!((next.team1_score, next.team2_score), (2, 2));
        assert!(!is_final);

        // 3-1 -> final.
        result.results = vec![];
        let (next, is_final) = record_set_winner(
            result,
            Side::Blue,
            Side::Blue,
            4,
            log("d"),
            MatchFormat::Bo5,
        );
        assert_eq!((next.team1_score, next.team2_score), (3, 1));
        assert!(is_final);
    }

    #[test]
    fn determinism_same_inputs_same_outputs() {
        let run = || {
            record_set_winner(
                GameResult::default(),
                Side::Red,
                Side::Blue,
                1,
                log("a"),
                MatchFormat::Bo5,
            )
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn results_padded_to_stay_set_aligned() {
        // Recording set 3 into an empty log pads sets 1 and 2.
        let (result, _) = record_set_winner(
            GameResult::default(),
            Side::Blue,
            Side::Blue,
            3,
            log("third"),
            MatchFormat::Bo5,
        );
        assert_eq!(result.results.len(), 3);
        assert!(result.results[0].iter().all(String::is_empty));
        assert!(result.results[1].iter().all(String::is_empty));
        assert_eq!(result.results[2], log("third"));
    }

    #[test]
    fn side_choice_log_untouched_by_scoring() {
        let (result, _) = record_set_winner(
            GameResult::default(),
            Side::Blue,
            Side::Blue,
            1,
            log("a"),
            MatchFormat::Bo3,
        );
        assert!(result.side_choices.is_empty());
    }
}

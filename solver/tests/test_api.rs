//! Advisory API tests against the greedy baseline table.
//!
//! The greedy table stores the current score of every live canonical board,
//! so `evaluate(board) == score(board)` for every live board. That makes the
//! expected decisions hand-checkable without a solved table.

use std::sync::{Arc, OnceLock};

use qwixx::actions::{Action, SumChoice};
use qwixx::dice_mechanics::Roll;
use qwixx::error::SolverError;
use qwixx::game_mechanics::score;
use qwixx::state_computation::greedy_state_values;
use qwixx::tables::Tables;
use qwixx::types::{Board, Color, QwixxContext};

static CTX: OnceLock<Arc<QwixxContext>> = OnceLock::new();

fn setup_ctx() -> Arc<QwixxContext> {
    let values = greedy_state_values(&Tables::new());
    Arc::new(QwixxContext::with_values(values))
}

fn get_ctx() -> Arc<QwixxContext> {
    CTX.get_or_init(setup_ctx).clone()
}

fn marks_added(before: &Board, after: &Board) -> u32 {
    after.total_marks() - before.total_marks()
}

// ── evaluate ─────────────────────────────────────────────────────────

#[test]
fn test_evaluate_empty_board() {
    let ctx = get_ctx();
    assert_eq!(ctx.evaluate(&Board::new()).unwrap(), 0.0);
}

#[test]
fn test_evaluate_matches_score_for_live_boards() {
    let ctx = get_ctx();
    let boards = [
        Board::new().with_row(Color::Red, 3, 7),
        Board::new()
            .with_row(Color::Yellow, 6, 12)
            .with_row(Color::Blue, 2, 9)
            .with_penalties(3),
        Board::new()
            .with_row(Color::Green, 9, 2)
            .with_row(Color::Red, 4, 8)
            .with_row(Color::Blue, 4, 8),
    ];
    for board in boards {
        assert_eq!(ctx.evaluate(&board).unwrap(), score(&board) as f32, "{board}");
    }
}

#[test]
fn test_evaluate_two_locked_rows_without_table() {
    // All-pending table: a finished game must never touch it.
    let ctx = QwixxContext::new();
    let board = Board::new()
        .with_row(Color::Red, 6, 12)
        .with_row(Color::Green, 6, 2);
    assert_eq!(ctx.evaluate(&board).unwrap(), 56.0);
}

#[test]
fn test_evaluate_four_penalties_is_exact() {
    let ctx = QwixxContext::new();
    let board = Board::new().with_row(Color::Yellow, 3, 9).with_penalties(4);
    assert_eq!(ctx.evaluate(&board).unwrap(), -14.0);
}

#[test]
fn test_uncomputed_table_is_an_ordering_violation() {
    let ctx = QwixxContext::new();
    match ctx.evaluate(&Board::new()) {
        Err(SolverError::OrderingViolation { index, board }) => {
            assert_eq!(index, 0);
            assert_eq!(board, Board::new());
        }
        other => panic!("expected ordering violation, got {other:?}"),
    }
}

#[test]
fn test_invalid_boards_are_rejected() {
    let ctx = get_ctx();
    assert!(matches!(
        ctx.evaluate(&Board::new().with_row(Color::Red, 3, 2)),
        Err(SolverError::InvalidRow { marks: 3, rightmost: 2 })
    ));
    assert!(matches!(
        ctx.evaluate(&Board::new().with_penalties(5)),
        Err(SolverError::InvalidPenalties(5))
    ));
}

#[test]
fn test_json_requests_are_validated() {
    let ctx = get_ctx();
    let board = Board::new().with_row(Color::Red, 5, 9);
    let board: Board = serde_json::from_str(&serde_json::to_string(&board).unwrap()).unwrap();

    let bad_roll = serde_json::from_str::<Roll>(r#"{"white":[6,7],"colored":[7,1,1,1]}"#);
    let err = bad_roll.unwrap_err().to_string();
    assert!(err.contains("invalid die value 7"), "{err}");
    assert!(matches!(
        Roll::new([6, 7], [7, 1, 1, 1]),
        Err(SolverError::InvalidDie(7))
    ));

    let roll: Roll = serde_json::from_str(r#"{"white":[6,6],"colored":[6,1,1,1]}"#).unwrap();
    let decision = ctx.best_action(&board, &roll).unwrap();
    for row in &decision.board.rows {
        assert!(row.rightmost <= 12, "{}", decision.board);
    }

    let mut misplaced = board;
    misplaced.rows.swap(0, 1);
    assert!(matches!(
        ctx.best_action(&misplaced, &roll),
        Err(SolverError::RowColor { .. })
    ));
}

// ── best_action ──────────────────────────────────────────────────────

#[test]
fn test_best_action_end_to_end() {
    let ctx = get_ctx();
    let board = Board::new();
    let roll = Roll::new([3, 5], [2, 4, 6, 6]).unwrap();
    let decision = ctx.best_action(&board, &roll).unwrap();

    assert_eq!(marks_added(&board, &decision.board), decision.action.marks());
    assert_eq!(decision.value, ctx.evaluate(&decision.board).unwrap());

    assert_eq!(
        decision.action,
        Action::WhiteThenColor {
            white: Color::Yellow,
            color: Color::Yellow,
            sum: SumChoice::Low,
        }
    );
    assert_eq!(decision.action_id, 12);
    assert_eq!(decision.value, 3.0);
}

#[test]
fn test_best_action_on_finished_game() {
    let ctx = get_ctx();
    let board = Board::new().with_penalties(4);
    let roll = Roll::new([1, 1], [1, 1, 1, 1]).unwrap();
    assert!(matches!(
        ctx.best_action(&board, &roll),
        Err(SolverError::GameOver)
    ));
}

#[test]
fn test_best_action_prefers_closing_the_game() {
    // One lock in hand; locking blue ends the game with a higher score than
    // anything a live continuation is worth under the greedy table.
    let ctx = get_ctx();
    let board = Board::new()
        .with_row(Color::Red, 6, 12)
        .with_row(Color::Blue, 5, 5)
        .with_penalties(2);
    let roll = Roll::new([1, 4], [1, 1, 1, 1]).unwrap();
    let decision = ctx.best_action(&board, &roll).unwrap();
    assert!(decision.board.row(Color::Blue).is_locked(), "{}", decision.action);
    assert_eq!(decision.value, score(&decision.board) as f32);
}

// ── rank_actions ─────────────────────────────────────────────────────

#[test]
fn test_rank_actions_contains_best() {
    let ctx = get_ctx();
    let board = Board::new()
        .with_row(Color::Red, 2, 5)
        .with_row(Color::Green, 1, 10)
        .with_penalties(1);
    let roll = Roll::new([6, 2], [3, 5, 1, 4]).unwrap();

    let ranked = ctx.rank_actions(&board, &roll).unwrap();
    assert_eq!(ranked[0].action, Action::Penalty);
    assert_eq!(ranked[0].position.board.penalties, 2);

    let best = ctx.best_action(&board, &roll).unwrap();
    let max = ranked
        .iter()
        .map(|c| c.value)
        .fold(f32::NEG_INFINITY, f32::max);
    assert_eq!(best.value, max);
    let first_max = ranked.iter().find(|c| c.value == max).unwrap();
    assert_eq!(first_max.action, best.action);

    for c in &ranked {
        assert_eq!(marks_added(&board, &c.position.board), c.action.marks());
    }
}

#[test]
fn test_expected_value_not_below_penalty() {
    let ctx = get_ctx();
    let board = Board::new()
        .with_row(Color::Yellow, 4, 8)
        .with_penalties(2);
    let ev = ctx.expected_value(&board).unwrap();
    let penalty_value = ctx.evaluate(&board.with_penalties(3)).unwrap();
    assert!(ev >= penalty_value as f64, "ev={ev} penalty={penalty_value}");
}

//! Advisory API: value lookups and move recommendations for concrete boards.
//!
//! All entry points validate the board first (reachable rows, 0-4 penalties),
//! then read the value table through the clip-and-offset lookup implemented
//! on [`QwixxContext`]. Finished games are scored directly and never touch
//! the table.

use serde::Serialize;

use crate::actions::Action;
use crate::dice_mechanics::Roll;
use crate::error::{Result, SolverError};
use crate::game_mechanics::{is_game_over, score};
use crate::types::{Board, Position, QwixxContext};
use crate::widget_solver::{ActionEvaluator, Candidate, ValueSource};

/// A recommended (or ranked) action and where it leads.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Decision {
    pub action: Action,
    pub action_id: u8,
    pub description: ActionLabel,
    pub board: Board,
    /// Expected final score after taking the action.
    pub value: f32,
}

/// Serializes an action as its human-readable description.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionLabel(pub Action);

impl Serialize for ActionLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl From<Candidate> for Decision {
    fn from(c: Candidate) -> Self {
        Decision {
            action: c.action,
            action_id: c.action.id(),
            description: ActionLabel(c.action),
            board: c.position.board,
            value: c.value,
        }
    }
}

impl QwixxContext {
    fn live_position(&self, board: &Board) -> Result<Position> {
        let position = Position::new(self.codec(), *board)?;
        if is_game_over(&position.board) {
            return Err(SolverError::GameOver);
        }
        Ok(position)
    }

    /// Expected final score from `board` under optimal play.
    pub fn evaluate(&self, board: &Board) -> Result<f32> {
        let position = Position::new(self.codec(), *board)?;
        if is_game_over(&position.board) {
            return Ok(score(&position.board) as f32);
        }
        self.continuation_value(&position)
    }

    /// Best action for one observed roll. `value` equals `evaluate(&board)`.
    pub fn best_action(&self, board: &Board, roll: &Roll) -> Result<Decision> {
        let origin = self.live_position(board)?;
        let best = ActionEvaluator::new(self.codec(), self, origin).best_for_roll(roll)?;
        Ok(best.into())
    }

    /// Every legal action for one roll, in enumeration order.
    pub fn rank_actions(&self, board: &Board, roll: &Roll) -> Result<Vec<Candidate>> {
        let origin = self.live_position(board)?;
        ActionEvaluator::new(self.codec(), self, origin).candidates_for_roll(roll)
    }

    /// One-step look-ahead over every roll from `board`, using the table for
    /// the successors. On a fully solved table this reproduces `evaluate`.
    pub fn expected_value(&self, board: &Board) -> Result<f64> {
        let origin = self.live_position(board)?;
        ActionEvaluator::new(self.codec(), self, origin).expected_value()
    }
}

//! Qwixx rules: mark legality, row transitions and final scoring.

use crate::constants::*;
use crate::types::{Board, Family, RowState};

/// Try to cross off `value` on `row`. Returns the new row if the move is legal.
///
/// Ascending rows need `value > rightmost`; descending rows need
/// `value < rightmost` (or an untouched row). Either way the lock value is only
/// available once the row already holds [`MARKS_TO_LOCK`] marks.
#[inline(always)]
pub fn can_mark(row: &RowState, value: u8) -> Option<RowState> {
    if !(MIN_ROW_VALUE..=MAX_ROW_VALUE).contains(&value) {
        return None;
    }
    let lock_ready = row.marks >= MARKS_TO_LOCK;
    let legal = match row.color.family() {
        Family::Ascending => value > row.rightmost && (value < MAX_ROW_VALUE || lock_ready),
        Family::Descending => {
            (value < row.rightmost || row.marks == 0) && (value > MIN_ROW_VALUE || lock_ready)
        }
    };
    if !legal {
        return None;
    }
    Some(RowState {
        color: row.color,
        marks: row.marks + 1,
        rightmost: value,
    })
}

/// Points for one row. A lock counts as one extra mark.
#[inline(always)]
pub fn row_score(row: &RowState) -> i32 {
    ROW_SCORES[row.marks as usize + row.is_locked() as usize]
}

/// Final score of a board: row scores minus 5 per penalty.
#[inline(always)]
pub fn score(board: &Board) -> i32 {
    let rows: i32 = board.rows.iter().map(row_score).sum();
    rows - PENALTY_POINTS * board.penalties as i32
}

#[inline(always)]
pub fn locked_rows(board: &Board) -> usize {
    board.rows.iter().filter(|r| r.is_locked()).count()
}

/// The game ends on the fourth penalty or once two rows are locked.
#[inline(always)]
pub fn is_game_over(board: &Board) -> bool {
    board.penalties >= MAX_PENALTIES || locked_rows(board) >= LOCKS_TO_END
}

//! Error type shared by the solver, storage and advisory layers.

use crate::types::{Board, Color};

#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("invalid die value {0} (expected 1-6)")]
    InvalidDie(u8),

    #[error("unreachable row state: {marks} marks with rightmost value {rightmost}")]
    InvalidRow { marks: u8, rightmost: u8 },

    #[error("row slot {slot:?} holds a {found:?} row")]
    RowColor { slot: Color, found: Color },

    #[error("invalid penalty count {0} (expected 0-4)")]
    InvalidPenalties(u8),

    #[error("value table file is {actual} bytes, expected {expected}")]
    TableSize { expected: u64, actual: u64 },

    #[error("table entry {index} read before it was computed (board {board})")]
    OrderingViolation { index: usize, board: Board },

    #[error("table entry {index} marks end of game but board {board} is still live")]
    CorruptTable { index: usize, board: Board },

    #[error("the game is already over")]
    GameOver,

    #[error("memory-mapped value table is read-only")]
    ReadOnlyTable,

    #[error("worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SolverError>;

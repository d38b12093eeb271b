//! Core data structures: colors, rows, boards, the value table and the solver context.
//!
//! The central type is [`QwixxContext`], which pairs the immutable lookup
//! [`Tables`] with the value table E[s]. The tables are built once by
//! [`Tables::new`] and never change; the value table is filled by
//! [`crate::state_computation`] or loaded by [`crate::storage`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, SolverError};
use crate::row_codec::RowCodec;
use crate::tables::Tables;

/// Direction in which a row's values must progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    /// 2 → 12, locks on 12.
    Ascending,
    /// 12 → 2, locks on 2.
    Descending,
}

impl Family {
    /// The extreme value whose mark locks the row.
    #[inline(always)]
    pub fn lock_value(self) -> u8 {
        match self {
            Family::Ascending => MAX_ROW_VALUE,
            Family::Descending => MIN_ROW_VALUE,
        }
    }

    /// Map a rightmost value onto the ascending scale (0 stays 0). Values off
    /// the descending sheet map to `u8::MAX`.
    #[inline(always)]
    pub fn effective(self, rightmost: u8) -> u8 {
        match self {
            Family::Descending if rightmost > 0 => REFLECT_BOUND
                .checked_sub(rightmost)
                .filter(|&v| v > 0)
                .unwrap_or(u8::MAX),
            _ => rightmost,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
}

impl Color {
    pub const ALL: [Color; NUM_COLORS] = [Color::Red, Color::Yellow, Color::Green, Color::Blue];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub fn from_index(index: usize) -> Color {
        Color::ALL[index]
    }

    #[inline(always)]
    pub fn family(self) -> Family {
        match self {
            Color::Red | Color::Yellow => Family::Ascending,
            Color::Green | Color::Blue => Family::Descending,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One color row: how many boxes are crossed and the rightmost crossed value.
///
/// `rightmost` is the printed value (2-12), or 0 while the row is untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowState {
    pub color: Color,
    pub marks: u8,
    pub rightmost: u8,
}

impl RowState {
    pub fn empty(color: Color) -> Self {
        Self {
            color,
            marks: 0,
            rightmost: 0,
        }
    }

    pub fn new(color: Color, marks: u8, rightmost: u8) -> Self {
        Self {
            color,
            marks,
            rightmost,
        }
    }

    #[inline(always)]
    pub fn is_locked(&self) -> bool {
        self.marks > 0 && self.rightmost == self.color.family().lock_value()
    }
}

/// Full score sheet: four rows plus the penalty count (0-4).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    pub rows: [RowState; NUM_COLORS],
    pub penalties: u8,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Empty sheet, no penalties.
    pub fn new() -> Self {
        Self {
            rows: Color::ALL.map(RowState::empty),
            penalties: 0,
        }
    }

    #[inline(always)]
    pub fn row(&self, color: Color) -> &RowState {
        &self.rows[color.index()]
    }

    /// Builder used by front-ends and tests: set one row's (marks, rightmost).
    pub fn with_row(mut self, color: Color, marks: u8, rightmost: u8) -> Self {
        self.rows[color.index()] = RowState::new(color, marks, rightmost);
        self
    }

    pub fn with_penalties(mut self, penalties: u8) -> Self {
        self.penalties = penalties;
        self
    }

    pub fn total_marks(&self) -> u32 {
        self.rows.iter().map(|r| r.marks as u32).sum()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let tag = match row.color {
                Color::Red => 'R',
                Color::Yellow => 'Y',
                Color::Green => 'G',
                Color::Blue => 'B',
            };
            write!(f, "{}:{}/{} ", tag, row.marks, row.rightmost)?;
        }
        write!(f, "P:{}", self.penalties)
    }
}

/// A board together with its raw (0-61) row indices.
///
/// The evaluator moves positions around instead of boards so that a mark only
/// re-encodes the row it touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub rows: [u8; NUM_COLORS],
}

impl Position {
    /// Validate and encode an externally supplied board.
    pub fn new(codec: &RowCodec, board: Board) -> Result<Self> {
        if board.penalties > MAX_PENALTIES {
            return Err(SolverError::InvalidPenalties(board.penalties));
        }
        let mut rows = [0u8; NUM_COLORS];
        for (color, (slot, row)) in Color::ALL.into_iter().zip(rows.iter_mut().zip(&board.rows)) {
            if row.color != color {
                return Err(SolverError::RowColor {
                    slot: color,
                    found: row.color,
                });
            }
            *slot = codec.try_encode(row).ok_or(SolverError::InvalidRow {
                marks: row.marks,
                rightmost: row.rightmost,
            })?;
        }
        Ok(Self { board, rows })
    }

    /// Rebuild a position from row indices (trusted, e.g. decoded from the table).
    pub fn from_rows(codec: &RowCodec, rows: [u8; NUM_COLORS], penalties: u8) -> Self {
        let mut board = Board::new();
        for color in Color::ALL {
            board.rows[color.index()] = codec.decode(color, rows[color.index()]);
        }
        board.penalties = penalties;
        Self { board, rows }
    }

    /// Cross off `value` in `color`'s row, if the rules allow it.
    #[inline(always)]
    pub fn mark(&self, codec: &RowCodec, color: Color, value: u8) -> Option<Position> {
        let row = crate::game_mechanics::can_mark(self.board.row(color), value)?;
        let mut next = *self;
        next.board.rows[color.index()] = row;
        next.rows[color.index()] = codec.encode(&row);
        Some(next)
    }

    /// The same position with one more penalty.
    #[inline(always)]
    pub fn with_penalty(&self) -> Position {
        let mut next = *self;
        next.board.penalties += 1;
        next
    }
}

/// Decoded value-table entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TableEntry {
    /// Expected final score under optimal play.
    Value(f32),
    /// Not written yet.
    Pending,
    /// Terminal canonical slot: many real scores alias here, use the scoring function.
    EndOfGame,
}

impl TableEntry {
    /// On-disk representation: NaN for pending, -inf for end of game.
    #[inline(always)]
    pub fn to_f32(self) -> f32 {
        match self {
            TableEntry::Value(v) => v,
            TableEntry::Pending => f32::NAN,
            TableEntry::EndOfGame => f32::NEG_INFINITY,
        }
    }

    #[inline(always)]
    pub fn from_f32(raw: f32) -> Self {
        if raw.is_nan() {
            TableEntry::Pending
        } else if raw == f32::NEG_INFINITY {
            TableEntry::EndOfGame
        } else {
            TableEntry::Value(raw)
        }
    }
}

/// E[s] storage: either owned (during computation) or memory-mapped (loaded from disk).
pub enum StateValues {
    Owned(Vec<f32>),
    #[cfg(feature = "full")]
    Mmap { mmap: memmap2::Mmap },
}

impl Default for StateValues {
    fn default() -> Self {
        Self::pending()
    }
}

impl StateValues {
    /// Fresh table with every entry pending.
    pub fn pending() -> Self {
        StateValues::Owned(vec![f32::NAN; MARKOV_STATES])
    }

    pub fn as_slice(&self) -> &[f32] {
        match self {
            StateValues::Owned(v) => v.as_slice(),
            #[cfg(feature = "full")]
            StateValues::Mmap { mmap } => {
                let data_ptr = mmap.as_ptr() as *const f32;
                unsafe { std::slice::from_raw_parts(data_ptr, MARKOV_STATES) }
            }
        }
    }

    pub fn as_mut_slice(&mut self) -> Result<&mut [f32]> {
        match self {
            StateValues::Owned(v) => Ok(v.as_mut_slice()),
            #[cfg(feature = "full")]
            StateValues::Mmap { .. } => Err(SolverError::ReadOnlyTable),
        }
    }

    #[inline(always)]
    pub fn entry(&self, index: usize) -> TableEntry {
        TableEntry::from_f32(self.as_slice()[index])
    }

    pub fn set(&mut self, index: usize, entry: TableEntry) -> Result<()> {
        self.as_mut_slice()?[index] = entry.to_f32();
        Ok(())
    }

    /// Number of entries still pending.
    pub fn pending_count(&self) -> usize {
        self.as_slice().iter().filter(|v| v.is_nan()).count()
    }
}

/// Lookup tables plus the value table: everything the advisory API needs.
pub struct QwixxContext {
    pub tables: Tables,
    pub state_values: StateValues,
}

impl QwixxContext {
    /// Build the lookup tables and attach an all-pending value table.
    pub fn new() -> Self {
        Self::with_values(StateValues::pending())
    }

    pub fn with_values(state_values: StateValues) -> Self {
        Self {
            tables: Tables::new(),
            state_values,
        }
    }

    #[inline(always)]
    pub fn codec(&self) -> &RowCodec {
        &self.tables.codec
    }
}

impl Default for QwixxContext {
    fn default() -> Self {
        Self::new()
    }
}

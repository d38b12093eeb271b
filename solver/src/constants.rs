//! Game constants and index-space dimensions.
//!
//! Index spaces, from finest to coarsest:
//! - raw row index: [`ROW_STATES`] = 62 per color
//! - reduced row index: [`REDUCED_ROW_STATES`] = 57 (raw 57..61 folded into 56)
//! - pair index: [`PAIR_STATES`] = 57·58/2 = 1,653
//! - quad index: [`QUAD_STATES`] = 1653·1654/2 = 1,367,031
//! - Markov index: [`MARKOV_STATES`] = 4 · QUAD_STATES + 1 = 5,468,125
//!
//! The raw space used by the generational engine has
//! [`RAW_STATES`] = 62^4 · 5 = 73,881,680 slots.

/// Number of color rows on the score sheet.
pub const NUM_COLORS: usize = 4;

/// Distinct (marks, rightmost value) states a single row can be in.
pub const ROW_STATES: usize = 62;

/// Row states tracked by the value table. Raw indices above [`CLIP_ROW`]
/// differ from it only by points already earned.
pub const REDUCED_ROW_STATES: usize = 57;

/// Highest reduced row index: a row locked with exactly 6 marks.
pub const CLIP_ROW: u8 = 56;

/// Extra points held by raw row indices 57..61 relative to [`CLIP_ROW`].
pub const LOCK_OFFSETS: [f32; 5] = [8.0, 17.0, 27.0, 38.0, 50.0];

/// Unordered pairs of reduced row indices.
pub const PAIR_STATES: usize = REDUCED_ROW_STATES * (REDUCED_ROW_STATES + 1) / 2;

/// Unordered pairs of pair indices.
pub const QUAD_STATES: usize = PAIR_STATES * (PAIR_STATES + 1) / 2;

/// Penalties at which the game ends.
pub const MAX_PENALTIES: u8 = 4;

/// Points lost per penalty.
pub const PENALTY_POINTS: i32 = 5;

/// Canonical table size: one block per live penalty count plus the terminal slot.
pub const MARKOV_STATES: usize = QUAD_STATES * MAX_PENALTIES as usize + 1;

/// The single Markov slot shared by every board with four penalties.
pub const TERMINAL_SLOT: usize = MARKOV_STATES - 1;

/// Raw (uncompressed) four-row combinations.
pub const RAW_ROW_COMBINATIONS: usize = ROW_STATES * ROW_STATES * ROW_STATES * ROW_STATES;

/// Raw table size: four-row combinations times penalty counts 0..=4.
pub const RAW_STATES: usize = RAW_ROW_COMBINATIONS * (MAX_PENALTIES as usize + 1);

/// Lowest and highest value printed on a row.
pub const MIN_ROW_VALUE: u8 = 2;
pub const MAX_ROW_VALUE: u8 = 12;

/// Descending rows are reflected through this bound so one table serves both
/// families: `effective = REFLECT_BOUND - rightmost`.
pub const REFLECT_BOUND: u8 = 14;

/// Marks a row must already hold before its lock value may be marked.
pub const MARKS_TO_LOCK: u8 = 5;

/// Rows that must be locked to end the game.
pub const LOCKS_TO_END: usize = 2;

/// Row score by mark count (locking counts as one extra mark).
pub const ROW_SCORES: [i32; 13] = [0, 1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 66, 78];

/// Faces per die.
pub const DIE_FACES: u8 = 6;

/// Equally likely outcomes of one roll of all six dice: 6^6.
pub const ROLL_OUTCOMES: usize = 46_656;

/// Equally likely outcomes of the four colored dice: 6^4.
pub const COLORED_OUTCOMES: usize = 1_296;

/// Default location of the persisted canonical table.
pub const DEFAULT_TABLE_PATH: &str = "data/qwixx.bin";

/// Flat array index for a live board: `penalties * QUAD_STATES + quad`.
#[inline(always)]
pub fn markov_slot(penalties: u8, quad: usize) -> usize {
    if penalties >= MAX_PENALTIES {
        TERMINAL_SLOT
    } else {
        penalties as usize * QUAD_STATES + quad
    }
}

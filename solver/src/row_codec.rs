//! Row codec: (marks, rightmost value) ↔ row index 0..61.
//!
//! Rows are laid out in bands by effective rightmost value (descending rows are
//! reflected through 14 first), and by mark count within a band:
//!
//! ```text
//! index 0        untouched
//! index 1        last mark 2,  1 mark
//! index 2..3     last mark 3,  1-2 marks
//! index 4..6     last mark 4,  1-3 marks
//! ...
//! index 46..55   last mark 11, 1-10 marks
//! index 56..61   last mark 12, 6-11 marks (locked)
//! ```
//!
//! Within the ascending family a mark always moves to a later band, so the
//! index strictly increases with every legal move.

use crate::constants::*;
use crate::types::{Color, RowState};

/// First index of the band whose effective rightmost value is `v` (2..=11).
#[inline(always)]
const fn band_start(v: u8) -> u8 {
    let k = v - MIN_ROW_VALUE;
    k * (k + 1) / 2 + 1
}

/// Encode/decode tables for a single row.
pub struct RowCodec {
    /// `encode[effective][marks]`; `None` for unreachable pairs.
    encode: [[Option<u8>; 12]; 13],
    /// `decode[index] = (effective rightmost, marks)`.
    decode: [(u8, u8); ROW_STATES],
}

impl Default for RowCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl RowCodec {
    pub fn new() -> Self {
        let mut encode = [[None; 12]; 13];
        let mut decode = [(0u8, 0u8); ROW_STATES];

        encode[0][0] = Some(0);

        for v in MIN_ROW_VALUE..MAX_ROW_VALUE {
            for marks in 1..v {
                let ix = band_start(v) + marks - 1;
                encode[v as usize][marks as usize] = Some(ix);
                decode[ix as usize] = (v, marks);
            }
        }

        // The lock value needs 5 earlier marks, so its band starts at 6 marks.
        for marks in (MARKS_TO_LOCK + 1)..=11 {
            let ix = CLIP_ROW + marks - (MARKS_TO_LOCK + 1);
            encode[MAX_ROW_VALUE as usize][marks as usize] = Some(ix);
            decode[ix as usize] = (MAX_ROW_VALUE, marks);
        }

        Self { encode, decode }
    }

    /// Row index of a reachable row. Must not be called for unreachable rows.
    #[inline(always)]
    pub fn encode(&self, row: &RowState) -> u8 {
        let ix = self.try_encode(row);
        debug_assert!(ix.is_some(), "unreachable row {:?}", row);
        ix.unwrap_or(0)
    }

    /// Row index, or `None` if (marks, rightmost) cannot occur in a game.
    #[inline(always)]
    pub fn try_encode(&self, row: &RowState) -> Option<u8> {
        let v = row.color.family().effective(row.rightmost) as usize;
        let marks = row.marks as usize;
        if v >= self.encode.len() || marks >= self.encode[0].len() {
            return None;
        }
        self.encode[v][marks]
    }

    #[inline(always)]
    pub fn decode(&self, color: Color, index: u8) -> RowState {
        let (v, marks) = self.decode[index as usize];
        let rightmost = color.family().effective(v);
        RowState::new(color, marks, rightmost)
    }
}

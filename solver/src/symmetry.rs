//! Symmetry compressor: four reduced row indices → one canonical quad index.
//!
//! Two exact symmetries of the single-player game are quotiented out:
//!
//! - Red and yellow follow identical rules, as do green and blue, so the two
//!   rows inside each family pair are interchangeable.
//! - An ascending row in state i behaves like a descending row in state i, so
//!   the red/yellow pair and the green/blue pair are interchangeable too.
//!
//! Both are realized by sorting before lookup: only the upper triangle
//! (`i <= j`, `p <= q`) of each table is populated.

use crate::constants::*;

/// Pair and quad lookup tables with their inverses.
pub struct SymmetryTables {
    /// `pair_index[i * REDUCED_ROW_STATES + j]` for `i <= j`.
    pair_index: Vec<u16>,
    /// `pair_rows[p] = (i, j)` with `i <= j`.
    pair_rows: Vec<(u8, u8)>,
    /// `quad_index[p * PAIR_STATES + q]` for `p <= q`.
    quad_index: Vec<u32>,
    /// `quad_pairs[c] = (p, q)` with `p <= q`.
    quad_pairs: Vec<(u16, u16)>,
}

impl Default for SymmetryTables {
    fn default() -> Self {
        Self::new()
    }
}

impl SymmetryTables {
    pub fn new() -> Self {
        let mut pair_index = vec![0u16; REDUCED_ROW_STATES * REDUCED_ROW_STATES];
        let mut pair_rows = Vec::with_capacity(PAIR_STATES);
        for i in 0..REDUCED_ROW_STATES {
            for j in i..REDUCED_ROW_STATES {
                pair_index[i * REDUCED_ROW_STATES + j] = pair_rows.len() as u16;
                pair_rows.push((i as u8, j as u8));
            }
        }

        let mut quad_index = vec![0u32; PAIR_STATES * PAIR_STATES];
        let mut quad_pairs = Vec::with_capacity(QUAD_STATES);
        for p in 0..PAIR_STATES {
            for q in p..PAIR_STATES {
                quad_index[p * PAIR_STATES + q] = quad_pairs.len() as u32;
                quad_pairs.push((p as u16, q as u16));
            }
        }

        debug_assert_eq!(pair_rows.len(), PAIR_STATES);
        debug_assert_eq!(quad_pairs.len(), QUAD_STATES);

        Self {
            pair_index,
            pair_rows,
            quad_index,
            quad_pairs,
        }
    }

    /// Pair index of two reduced rows, in either order.
    #[inline(always)]
    pub fn pair(&self, a: u8, b: u8) -> usize {
        let (i, j) = if a <= b { (a, b) } else { (b, a) };
        debug_assert!((j as usize) < REDUCED_ROW_STATES);
        self.pair_index[i as usize * REDUCED_ROW_STATES + j as usize] as usize
    }

    /// Quad index of two pair indices, in either order.
    #[inline(always)]
    pub fn quad(&self, p: usize, q: usize) -> usize {
        let (p, q) = if p <= q { (p, q) } else { (q, p) };
        self.quad_index[p * PAIR_STATES + q] as usize
    }

    /// Canonical quad index of four reduced rows (red, yellow, green, blue).
    #[inline(always)]
    pub fn canonical(&self, rows: &[u8; NUM_COLORS]) -> usize {
        let ascending = self.pair(rows[0], rows[1]);
        let descending = self.pair(rows[2], rows[3]);
        self.quad(ascending, descending)
    }

    /// Markov index of four reduced rows and a penalty count.
    #[inline(always)]
    pub fn markov_index(&self, rows: &[u8; NUM_COLORS], penalties: u8) -> usize {
        if penalties >= MAX_PENALTIES {
            return TERMINAL_SLOT;
        }
        markov_slot(penalties, self.canonical(rows))
    }

    #[inline(always)]
    pub fn pair_rows(&self, pair: usize) -> (u8, u8) {
        self.pair_rows[pair]
    }

    #[inline(always)]
    pub fn quad_pairs(&self, quad: usize) -> (usize, usize) {
        let (p, q) = self.quad_pairs[quad];
        (p as usize, q as usize)
    }

    /// Representative rows and penalty count of a Markov index, or `None` for
    /// the terminal slot. The representative has red ≤ yellow, green ≤ blue
    /// and (red, yellow) ≤ (green, blue) as pair indices.
    pub fn decode_markov(&self, index: usize) -> Option<([u8; NUM_COLORS], u8)> {
        if index >= TERMINAL_SLOT {
            return None;
        }
        let penalties = (index / QUAD_STATES) as u8;
        let (p, q) = self.quad_pairs(index % QUAD_STATES);
        let (r, y) = self.pair_rows(p);
        let (g, b) = self.pair_rows(q);
        Some(([r, y, g, b], penalties))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_tables() {
        let sym = SymmetryTables::new();
        for p in 0..PAIR_STATES {
            let (i, j) = sym.pair_rows(p);
            assert!(i <= j);
            assert_eq!(sym.pair(i, j), p);
            assert_eq!(sym.pair(j, i), p);
        }
        for c in [0, 1, 1652, 1653, 700_000, QUAD_STATES - 1] {
            let (p, q) = sym.quad_pairs(c);
            assert!(p <= q);
            assert_eq!(sym.quad(p, q), c);
            assert_eq!(sym.quad(q, p), c);
        }
    }

    #[test]
    fn test_corners() {
        let sym = SymmetryTables::new();
        assert_eq!(sym.canonical(&[0, 0, 0, 0]), 0);
        assert_eq!(sym.canonical(&[56, 56, 56, 56]), QUAD_STATES - 1);
        assert_eq!(sym.markov_index(&[0, 0, 0, 0], 3), 3 * QUAD_STATES);
        assert_eq!(sym.markov_index(&[10, 3, 40, 2], 4), TERMINAL_SLOT);
        assert_eq!(sym.decode_markov(TERMINAL_SLOT), None);
    }

    #[test]
    fn test_pair_index_increases_with_either_row() {
        // Backward induction relies on this: a mark on any row raises the index.
        let sym = SymmetryTables::new();
        for a in 0..REDUCED_ROW_STATES as u8 {
            for b in 0..REDUCED_ROW_STATES as u8 {
                if b + 1 < REDUCED_ROW_STATES as u8 {
                    assert!(sym.pair(a, b + 1) > sym.pair(a, b));
                }
            }
        }
    }

    #[test]
    fn test_decode_markov_round_trip() {
        let sym = SymmetryTables::new();
        for index in (0..TERMINAL_SLOT).step_by(9_973) {
            let (rows, penalties) = sym.decode_markov(index).unwrap();
            assert_eq!(sym.markov_index(&rows, penalties), index);
        }
    }
}

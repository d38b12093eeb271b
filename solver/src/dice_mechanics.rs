//! Dice: roll validation and the chance-node enumeration.
//!
//! A roll is two white dice plus one die per color. The white dice are
//! interchangeable, so the engine walks the 21 sorted white pairs and weights
//! each unequal pair twice: 15·2 + 6·1 = 36 outcomes.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, SolverError};
use crate::types::Color;

/// One throw of all six dice. `white` is kept sorted ascending.
///
/// Only [`Roll::new`] builds a roll, deserialization included, so every die
/// is known to be in 1..=6.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RollDice")]
pub struct Roll {
    white: [u8; 2],
    colored: [u8; NUM_COLORS],
}

/// Unchecked wire form of a [`Roll`].
#[derive(Deserialize)]
struct RollDice {
    white: [u8; 2],
    colored: [u8; NUM_COLORS],
}

impl TryFrom<RollDice> for Roll {
    type Error = SolverError;

    fn try_from(dice: RollDice) -> Result<Self> {
        Roll::new(dice.white, dice.colored)
    }
}

impl Roll {
    /// Validate every die and sort the white pair.
    pub fn new(white: [u8; 2], colored: [u8; NUM_COLORS]) -> Result<Self> {
        for &die in white.iter().chain(colored.iter()) {
            if !(1..=DIE_FACES).contains(&die) {
                return Err(SolverError::InvalidDie(die));
            }
        }
        let white = if white[0] <= white[1] {
            white
        } else {
            [white[1], white[0]]
        };
        Ok(Self { white, colored })
    }

    /// White dice, sorted ascending.
    #[inline(always)]
    pub fn white(&self) -> [u8; 2] {
        self.white
    }

    /// Colored dice in red, yellow, green, blue order.
    #[inline(always)]
    pub fn colored(&self) -> [u8; NUM_COLORS] {
        self.colored
    }

    #[inline(always)]
    pub fn low(&self) -> u8 {
        self.white[0]
    }

    #[inline(always)]
    pub fn high(&self) -> u8 {
        self.white[1]
    }

    #[inline(always)]
    pub fn colored_die(&self, color: Color) -> u8 {
        self.colored[color.index()]
    }
}

/// A sorted white pair and how many of the 36 ordered outcomes it stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WhitePair {
    pub low: u8,
    pub high: u8,
    pub multiplicity: u32,
}

impl WhitePair {
    /// Probability of this pair on a single throw of the two white dice.
    #[inline(always)]
    pub fn probability(&self) -> f64 {
        self.multiplicity as f64 / 36.0
    }
}

const fn build_white_pairs() -> [WhitePair; 21] {
    let mut pairs = [WhitePair {
        low: 0,
        high: 0,
        multiplicity: 0,
    }; 21];
    let mut n = 0;
    let mut low = 1;
    while low <= DIE_FACES {
        let mut high = low;
        while high <= DIE_FACES {
            pairs[n] = WhitePair {
                low,
                high,
                multiplicity: if low == high { 1 } else { 2 },
            };
            n += 1;
            high += 1;
        }
        low += 1;
    }
    pairs
}

/// The 21 sorted white pairs in enumeration order (low-major).
pub const WHITE_PAIRS: [WhitePair; 21] = build_white_pairs();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_pairs_conserve_probability() {
        let outcomes: u32 = WHITE_PAIRS.iter().map(|p| p.multiplicity).sum();
        assert_eq!(outcomes, 36);
        let total: f64 = WHITE_PAIRS.iter().map(|p| p.probability()).sum();
        assert!((total - 1.0).abs() < 1e-12, "total={total}");
        assert_eq!(
            outcomes as usize * COLORED_OUTCOMES,
            ROLL_OUTCOMES,
            "white pairs × colored dice must cover every throw"
        );
    }

    #[test]
    fn test_white_pairs_sorted_and_unique() {
        for (n, pair) in WHITE_PAIRS.iter().enumerate() {
            assert!(pair.low <= pair.high);
            for other in &WHITE_PAIRS[n + 1..] {
                assert!((pair.low, pair.high) < (other.low, other.high));
            }
        }
    }

    #[test]
    fn test_roll_validation() {
        let roll = Roll::new([5, 3], [2, 4, 6, 6]).unwrap();
        assert_eq!(roll.white(), [3, 5]);
        assert_eq!(roll.colored_die(Color::Green), 6);
        assert!(matches!(
            Roll::new([0, 3], [1, 1, 1, 1]),
            Err(SolverError::InvalidDie(0))
        ));
        assert!(matches!(
            Roll::new([1, 3], [1, 7, 1, 1]),
            Err(SolverError::InvalidDie(7))
        ));
    }

    #[test]
    fn test_deserialized_roll_is_validated() {
        let roll: Roll = serde_json::from_str(r#"{"white":[5,2],"colored":[1,2,3,4]}"#).unwrap();
        assert_eq!(roll.white(), [2, 5]);
        assert_eq!(roll.colored(), [1, 2, 3, 4]);

        let err = serde_json::from_str::<Roll>(r#"{"white":[6,7],"colored":[7,1,1,1]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid die value 7"), "{err}");
        let err = serde_json::from_str::<Roll>(r#"{"white":[1,1],"colored":[0,1,1,1]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid die value 0"), "{err}");
    }
}

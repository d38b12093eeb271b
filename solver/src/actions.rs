//! The fixed menu of 45 compound actions.
//!
//! Ids follow a stable layout so tables and logs stay comparable:
//!
//! ```text
//! 0            take a penalty
//! 1..=4        white sum as red / yellow / green / blue
//! 5 + 5c       color c alone, preferred sum
//! 6 + 5c + w   white sum as w, then color c with its preferred sum
//! 25 + 5c      color c alone, alternate sum
//! 26 + 5c + w  white sum as w, then color c with its alternate sum
//! ```
//!
//! Ascending colors prefer the low sum (low white + colored die) and
//! descending colors the high sum, since those leave the most boxes open.
//! The alternate sum only matters when it would lock the row.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Color, Family};

/// Number of distinct action ids.
pub const NUM_ACTIONS: usize = 45;

const PREFERRED_BASE: u8 = 5;
const ALTERNATE_BASE: u8 = 25;

/// Which white die is paired with the colored die.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SumChoice {
    /// Lower white die + colored die (falls back to the higher one).
    Low,
    /// Higher white die + colored die (falls back to the lower one).
    High,
}

impl SumChoice {
    /// The sum a color tries by default.
    #[inline(always)]
    pub fn preferred(color: Color) -> SumChoice {
        match color.family() {
            Family::Ascending => SumChoice::Low,
            Family::Descending => SumChoice::High,
        }
    }

    #[inline(always)]
    pub fn other(self) -> SumChoice {
        match self {
            SumChoice::Low => SumChoice::High,
            SumChoice::High => SumChoice::Low,
        }
    }

    /// (first try, fallback) for white dice `low <= high` and a colored die.
    #[inline(always)]
    pub fn sums(self, low: u8, high: u8, die: u8) -> (u8, u8) {
        match self {
            SumChoice::Low => (low + die, high + die),
            SumChoice::High => (high + die, low + die),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Penalty,
    WhiteAs(Color),
    ColorOnly {
        color: Color,
        sum: SumChoice,
    },
    WhiteThenColor {
        white: Color,
        color: Color,
        sum: SumChoice,
    },
}

impl Action {
    fn group_base(color: Color, sum: SumChoice) -> u8 {
        let base = if sum == SumChoice::preferred(color) {
            PREFERRED_BASE
        } else {
            ALTERNATE_BASE
        };
        base + 5 * color.index() as u8
    }

    pub fn id(&self) -> u8 {
        match *self {
            Action::Penalty => 0,
            Action::WhiteAs(c) => 1 + c.index() as u8,
            Action::ColorOnly { color, sum } => Self::group_base(color, sum),
            Action::WhiteThenColor { white, color, sum } => {
                Self::group_base(color, sum) + 1 + white.index() as u8
            }
        }
    }

    pub fn from_id(id: u8) -> Option<Action> {
        match id {
            0 => Some(Action::Penalty),
            1..=4 => Some(Action::WhiteAs(Color::from_index(id as usize - 1))),
            5..=44 => {
                let (base, preferred) = if id < ALTERNATE_BASE {
                    (id - PREFERRED_BASE, true)
                } else {
                    (id - ALTERNATE_BASE, false)
                };
                let color = Color::from_index((base / 5) as usize);
                let sum = if preferred {
                    SumChoice::preferred(color)
                } else {
                    SumChoice::preferred(color).other()
                };
                match base % 5 {
                    0 => Some(Action::ColorOnly { color, sum }),
                    w => Some(Action::WhiteThenColor {
                        white: Color::from_index(w as usize - 1),
                        color,
                        sum,
                    }),
                }
            }
            _ => None,
        }
    }

    /// Boxes this action crosses off (0 for the penalty).
    pub fn marks(&self) -> u32 {
        match self {
            Action::Penalty => 0,
            Action::WhiteAs(_) | Action::ColorOnly { .. } => 1,
            Action::WhiteThenColor { .. } => 2,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sum_name = |s: SumChoice| match s {
            SumChoice::Low => "low",
            SumChoice::High => "high",
        };
        match *self {
            Action::Penalty => write!(f, "take a penalty"),
            Action::WhiteAs(c) => write!(f, "white sum as {c}"),
            Action::ColorOnly { color, sum } => write!(f, "{} {color} only", sum_name(sum)),
            Action::WhiteThenColor { white, color, sum } => {
                write!(f, "white sum as {white}, then {} {color}", sum_name(sum))
            }
        }
    }
}

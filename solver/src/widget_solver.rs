//! Action evaluator: the per-state decision procedure and its expectation.
//!
//! For one white pair the work splits into independent stages:
//!
//! ```text
//! White stage  → penalty, white sum as each color        (depends on whites only)
//! Color stage  → options using one colored die          (whites + that die)
//! Roll         → first maximum over white stage then red, yellow, green, blue
//! Expectation  → Σ over 21 white pairs × 6^4 colored dice, weighted
//! ```
//!
//! Because a color stage only sees its own die, the expectation evaluates each
//! color stage once per die face (4 × 6) and then merges the 1,296 colored-dice
//! combinations with plain comparisons.
//!
//! Values come from a [`ValueSource`]: the canonical table in
//! [`crate::api_computations`], the raw buffer in [`crate::generational`], or a
//! stub in tests. Game-over positions never reach the source; they are scored
//! exactly.

use crate::actions::{Action, SumChoice};
use crate::constants::*;
use crate::dice_mechanics::{Roll, WHITE_PAIRS};
use crate::error::Result;
use crate::game_mechanics::{is_game_over, score};
use crate::row_codec::RowCodec;
use crate::types::{Color, Position};

/// Expected final score of live positions.
pub trait ValueSource {
    /// Value of a position that is not game over.
    fn continuation_value(&self, position: &Position) -> Result<f32>;
}

/// A legal action with its resulting position and value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub action: Action,
    pub value: f32,
    pub position: Position,
}

/// Options that only depend on the white dice.
#[derive(Clone, Copy, Debug)]
pub struct WhiteStage {
    pub low: u8,
    pub high: u8,
    pub penalty: Candidate,
    pub white_as: [Option<Candidate>; NUM_COLORS],
    /// First maximum of penalty and white-only options.
    pub best: Candidate,
}

pub struct ActionEvaluator<'a, S: ValueSource + ?Sized> {
    codec: &'a RowCodec,
    source: &'a S,
    origin: Position,
}

#[inline(always)]
fn merge(best: f32, candidate: Option<f32>) -> f32 {
    match candidate {
        Some(v) if v > best => v,
        _ => best,
    }
}

impl<'a, S: ValueSource + ?Sized> ActionEvaluator<'a, S> {
    pub fn new(codec: &'a RowCodec, source: &'a S, origin: Position) -> Self {
        Self {
            codec,
            source,
            origin,
        }
    }

    /// Exact score for a finished game, else the source's continuation value.
    #[inline(always)]
    pub fn outcome_value(&self, position: &Position) -> Result<f32> {
        if is_game_over(&position.board) {
            Ok(score(&position.board) as f32)
        } else {
            self.source.continuation_value(position)
        }
    }

    #[inline(always)]
    fn candidate(&self, action: Action, position: Position) -> Result<Candidate> {
        Ok(Candidate {
            action,
            value: self.outcome_value(&position)?,
            position,
        })
    }

    pub fn white_stage(&self, low: u8, high: u8) -> Result<WhiteStage> {
        let penalty = self.candidate(Action::Penalty, self.origin.with_penalty())?;
        let mut best = penalty;
        let mut white_as = [None; NUM_COLORS];
        for color in Color::ALL {
            if let Some(next) = self.origin.mark(self.codec, color, low + high) {
                let candidate = self.candidate(Action::WhiteAs(color), next)?;
                if candidate.value > best.value {
                    best = candidate;
                }
                white_as[color.index()] = Some(candidate);
            }
        }
        Ok(WhiteStage {
            low,
            high,
            penalty,
            white_as,
            best,
        })
    }

    /// Mark `color` with the chosen sum, falling back to the other white die.
    #[inline(always)]
    fn mark_with(
        &self,
        from: &Position,
        color: Color,
        choice: SumChoice,
        stage: &WhiteStage,
        die: u8,
    ) -> Option<Position> {
        let (first, second) = choice.sums(stage.low, stage.high, die);
        from.mark(self.codec, color, first)
            .or_else(|| from.mark(self.codec, color, second))
    }

    fn scan_group<F: FnMut(Candidate)>(
        &self,
        stage: &WhiteStage,
        color: Color,
        sum: SumChoice,
        die: u8,
        visit: &mut F,
    ) -> Result<()> {
        if let Some(next) = self.mark_with(&self.origin, color, sum, stage, die) {
            visit(self.candidate(Action::ColorOnly { color, sum }, next)?);
        }
        for white in Color::ALL {
            let Some(first) = stage.white_as[white.index()] else {
                continue;
            };
            if is_game_over(&first.position.board) {
                continue;
            }
            if let Some(next) = self.mark_with(&first.position, color, sum, stage, die) {
                visit(self.candidate(Action::WhiteThenColor { white, color, sum }, next)?);
            }
        }
        Ok(())
    }

    /// Visit every legal option that uses `color`'s die, in tie-break order.
    ///
    /// The alternate sum is only offered when it equals the lock value.
    pub fn scan_color<F: FnMut(Candidate)>(
        &self,
        stage: &WhiteStage,
        color: Color,
        die: u8,
        mut visit: F,
    ) -> Result<()> {
        let preferred = SumChoice::preferred(color);
        self.scan_group(stage, color, preferred, die, &mut visit)?;

        let alternate = preferred.other();
        let (alternate_sum, _) = alternate.sums(stage.low, stage.high, die);
        if alternate_sum == color.family().lock_value() {
            self.scan_group(stage, color, alternate, die, &mut visit)?;
        }
        Ok(())
    }

    /// First maximum among the options using `color`'s die.
    pub fn best_for_color(
        &self,
        stage: &WhiteStage,
        color: Color,
        die: u8,
    ) -> Result<Option<Candidate>> {
        let mut best: Option<Candidate> = None;
        self.scan_color(stage, color, die, |candidate| {
            if best.map_or(true, |b| candidate.value > b.value) {
                best = Some(candidate);
            }
        })?;
        Ok(best)
    }

    /// Single-roll mode: the arg-max action for one observed throw.
    pub fn best_for_roll(&self, roll: &Roll) -> Result<Candidate> {
        let stage = self.white_stage(roll.low(), roll.high())?;
        let mut best = stage.best;
        for color in Color::ALL {
            if let Some(candidate) = self.best_for_color(&stage, color, roll.colored_die(color))? {
                if candidate.value > best.value {
                    best = candidate;
                }
            }
        }
        Ok(best)
    }

    /// Every legal candidate for one throw, in enumeration order.
    pub fn candidates_for_roll(&self, roll: &Roll) -> Result<Vec<Candidate>> {
        let stage = self.white_stage(roll.low(), roll.high())?;
        let mut all = vec![stage.penalty];
        all.extend(stage.white_as.iter().flatten());
        for color in Color::ALL {
            self.scan_color(&stage, color, roll.colored_die(color), |c| all.push(c))?;
        }
        Ok(all)
    }

    /// Expectation mode: E[best action value] over every throw of the six dice.
    pub fn expected_value(&self) -> Result<f64> {
        let mut total = 0.0f64;
        for pair in WHITE_PAIRS.iter() {
            let stage = self.white_stage(pair.low, pair.high)?;
            let mut by_die = [[None; DIE_FACES as usize]; NUM_COLORS];
            for color in Color::ALL {
                for die in 1..=DIE_FACES {
                    by_die[color.index()][(die - 1) as usize] = self
                        .best_for_color(&stage, color, die)?
                        .map(|c| c.value);
                }
            }
            total += pair.multiplicity as f64 * sum_of_maxima(stage.best.value, &by_die);
        }
        Ok(total / ROLL_OUTCOMES as f64)
    }
}

/// Σ over the 6^4 colored throws of the first maximum, merged red → blue.
fn sum_of_maxima(floor: f32, by_die: &[[Option<f32>; DIE_FACES as usize]; NUM_COLORS]) -> f64 {
    let [red, yellow, green, blue] = by_die;
    let mut sum = 0.0f64;
    for &r in red {
        let after_red = merge(floor, r);
        for &y in yellow {
            let after_yellow = merge(after_red, y);
            for &g in green {
                let after_green = merge(after_yellow, g);
                for &b in blue {
                    sum += merge(after_green, b) as f64;
                }
            }
        }
    }
    sum
}

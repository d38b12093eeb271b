//! Backward induction: compute E[s] for every Markov index.
//!
//! Markov indices are visited in strictly decreasing order. Every legal mark
//! raises the index of the (clipped) successor, and penalties either move to a
//! higher penalty block or end the game, so every lookup made by
//! [`ActionEvaluator::expected_value`] hits a slot that is already written. A
//! read of a pending slot is reported as [`SolverError::OrderingViolation`].
//!
//! The pass is sequential: it is the reference engine. The parallel
//! alternative is [`crate::generational`].

use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::constants::*;
use crate::error::{Result, SolverError};
use crate::game_mechanics::{is_game_over, score};
use crate::tables::Tables;
use crate::types::{Position, QwixxContext, StateValues, TableEntry};
use crate::widget_solver::{ActionEvaluator, ValueSource};

const REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Stop conditions for partial runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct ComputeOptions {
    /// Stop after this many indices.
    pub max_states: Option<usize>,
    /// Stop once this much wall time has elapsed.
    pub time_limit: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComputeSummary {
    /// Indices written (values and end-of-game markers).
    pub computed: usize,
    /// Of those, how many were end-of-game.
    pub terminal: usize,
    /// Lowest index written; everything at or above it is final.
    pub lowest_index: usize,
    /// True when index 0 was reached.
    pub complete: bool,
    pub elapsed: Duration,
}

/// Progress tracker for the backward pass.
struct ComputeProgress {
    total_states: usize,
    completed_states: usize,
    start_time: Instant,
    last_report_time: Instant,
}

impl ComputeProgress {
    fn new(total_states: usize) -> Self {
        let now = Instant::now();
        ComputeProgress {
            total_states,
            completed_states: 0,
            start_time: now,
            last_report_time: now,
        }
    }

    fn report(&mut self, index: usize) {
        let now = Instant::now();
        if self.completed_states < self.total_states
            && now.duration_since(self.last_report_time) < REPORT_INTERVAL
        {
            return;
        }
        self.last_report_time = now;

        let elapsed = now.duration_since(self.start_time).as_secs_f64();
        let pct = self.completed_states as f64 / self.total_states as f64 * 100.0;
        let rate = self.completed_states as f64 / elapsed.max(1e-9);
        let eta = (self.total_states - self.completed_states) as f64 / rate.max(1e-9);
        log::info!(
            "Progress: {}/{} states ({:.1}%) | Index: {} | Elapsed: {:.1}s | Rate: {:.0} states/s | ETA: {:.0}s",
            self.completed_states,
            self.total_states,
            pct,
            index,
            elapsed,
            rate,
            eta
        );
    }
}

/// Canonical lookup: clip rows above [`CLIP_ROW`], add their fixed offsets.
impl ValueSource for QwixxContext {
    fn continuation_value(&self, position: &Position) -> Result<f32> {
        let mut reduced = position.rows;
        let mut offset = 0.0f32;
        for row in reduced.iter_mut() {
            if *row > CLIP_ROW {
                offset += LOCK_OFFSETS[(*row - CLIP_ROW - 1) as usize];
                *row = CLIP_ROW;
            }
        }
        let index = self
            .tables
            .symmetry
            .markov_index(&reduced, position.board.penalties);
        match self.state_values.entry(index) {
            TableEntry::Value(v) => Ok(v + offset),
            TableEntry::Pending => Err(SolverError::OrderingViolation {
                index,
                board: position.board,
            }),
            TableEntry::EndOfGame if reduced != position.rows => {
                log::warn!(
                    "End-of-game slot {} reached through clipping for {}; scoring exactly",
                    index,
                    position.board
                );
                Ok(score(&position.board) as f32)
            }
            TableEntry::EndOfGame => Err(SolverError::CorruptTable {
                index,
                board: position.board,
            }),
        }
    }
}

/// The value a single Markov index should hold, given every higher index.
pub fn compute_state_value(ctx: &QwixxContext, index: usize) -> Result<TableEntry> {
    let Some((rows, penalties)) = ctx.tables.symmetry.decode_markov(index) else {
        return Ok(TableEntry::EndOfGame);
    };
    let origin = Position::from_rows(ctx.codec(), rows, penalties);
    if is_game_over(&origin.board) {
        return Ok(TableEntry::EndOfGame);
    }
    let ev = ActionEvaluator::new(ctx.codec(), ctx, origin).expected_value()?;
    Ok(TableEntry::Value(ev as f32))
}

/// Fill the value table from the top index down.
///
/// Partial runs stop early per `options`; the written suffix is final and can
/// be persisted and queried for any board whose successors lie inside it.
pub fn compute_all_state_values(
    ctx: &mut QwixxContext,
    options: &ComputeOptions,
) -> Result<ComputeSummary> {
    let target = options
        .max_states
        .map_or(MARKOV_STATES, |n| n.min(MARKOV_STATES));
    let mut progress = ComputeProgress::new(target);

    log::info!("=== Starting State Value Computation ===");
    log::info!(
        "Markov indices: {} ({} per penalty block), computing {}",
        MARKOV_STATES,
        QUAD_STATES,
        target
    );
    if let Some(limit) = options.time_limit {
        log::info!("Time limit: {:.0}s", limit.as_secs_f64());
    }

    let start = Instant::now();
    let mut terminal = 0usize;
    let mut lowest_index = MARKOV_STATES;

    for index in (0..MARKOV_STATES).rev() {
        if progress.completed_states >= target {
            break;
        }
        if progress.completed_states % 1024 == 0 {
            if let Some(limit) = options.time_limit {
                if start.elapsed() >= limit {
                    log::info!("Time limit reached at index {}", index);
                    break;
                }
            }
        }

        let entry = compute_state_value(ctx, index)?;
        if entry == TableEntry::EndOfGame {
            terminal += 1;
        }
        ctx.state_values.set(index, entry)?;

        lowest_index = index;
        progress.completed_states += 1;
        progress.report(index);
    }

    let summary = ComputeSummary {
        computed: progress.completed_states,
        terminal,
        lowest_index,
        complete: lowest_index == 0,
        elapsed: start.elapsed(),
    };
    log::info!(
        "=== Computation {} === {} states ({} end-of-game) in {:.2}s",
        if summary.complete { "Complete" } else { "Stopped" },
        summary.computed,
        summary.terminal,
        summary.elapsed.as_secs_f64()
    );
    if summary.complete {
        if let TableEntry::Value(v) = ctx.state_values.entry(0) {
            log::info!("Expected score from the empty sheet: {:.4}", v);
        }
    }
    Ok(summary)
}

/// Zero look-ahead table: every live entry holds the current score of its
/// canonical board. A cheap, fully populated baseline.
pub fn greedy_state_values(tables: &Tables) -> StateValues {
    let start = Instant::now();
    let mut values = vec![0.0f32; MARKOV_STATES];
    values
        .par_iter_mut()
        .enumerate()
        .for_each(|(index, slot)| {
            let entry = match tables.symmetry.decode_markov(index) {
                None => TableEntry::EndOfGame,
                Some((rows, penalties)) => {
                    let position = Position::from_rows(&tables.codec, rows, penalties);
                    if is_game_over(&position.board) {
                        TableEntry::EndOfGame
                    } else {
                        TableEntry::Value(score(&position.board) as f32)
                    }
                }
            };
            *slot = entry.to_f32();
        });
    log::debug!(
        "Greedy table built in {:.2} ms",
        start.elapsed().as_secs_f64() * 1000.0
    );
    StateValues::Owned(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Board, Color};

    #[test]
    fn test_terminal_slots_are_end_of_game() {
        let ctx = QwixxContext::new();
        assert_eq!(
            compute_state_value(&ctx, TERMINAL_SLOT).unwrap(),
            TableEntry::EndOfGame
        );
        let two_locks = ctx.tables.symmetry.markov_index(&[CLIP_ROW, 0, CLIP_ROW, 0], 0);
        assert_eq!(
            compute_state_value(&ctx, two_locks).unwrap(),
            TableEntry::EndOfGame
        );
    }

    #[test]
    fn test_pending_successor_is_an_ordering_violation() {
        let ctx = QwixxContext::new();
        let result = compute_state_value(&ctx, 0);
        assert!(
            matches!(result, Err(SolverError::OrderingViolation { .. })),
            "{result:?}"
        );
    }

    #[test]
    fn test_end_of_game_slot_behind_a_clipped_row() {
        let mut ctx = QwixxContext::new();
        let slot = ctx.tables.symmetry.markov_index(&[CLIP_ROW, 0, 0, 0], 0);
        ctx.state_values.set(slot, TableEntry::EndOfGame).unwrap();

        // eight marks ending in a lock clip down to the six-mark lock row
        let board = Board::new().with_row(Color::Red, 8, 12);
        let clipped = Position::new(ctx.codec(), board).unwrap();
        assert!(clipped.rows[0] > CLIP_ROW);
        let value = ctx.continuation_value(&clipped).unwrap();
        assert_eq!(value, score(&board) as f32);
        assert_eq!(value, ROW_SCORES[9] as f32);

        // the six-mark lock row reads the same slot without clipping
        let board = Board::new().with_row(Color::Red, 6, 12);
        let unclipped = Position::new(ctx.codec(), board).unwrap();
        assert_eq!(unclipped.rows[0], CLIP_ROW);
        let result = ctx.continuation_value(&unclipped);
        assert!(
            matches!(result, Err(SolverError::CorruptTable { index, .. }) if index == slot),
            "{result:?}"
        );
    }

    #[test]
    fn test_partial_run_never_reads_pending() {
        let mut ctx = QwixxContext::new();
        let options = ComputeOptions {
            max_states: Some(64),
            time_limit: None,
        };
        let summary = compute_all_state_values(&mut ctx, &options).unwrap();
        assert_eq!(summary.computed, 64);
        assert!(!summary.complete);
        assert_eq!(summary.lowest_index, MARKOV_STATES - 64);
        assert_eq!(ctx.state_values.pending_count(), MARKOV_STATES - 64);
        for index in summary.lowest_index..MARKOV_STATES {
            assert_ne!(ctx.state_values.entry(index), TableEntry::Pending);
        }
        assert!(summary.terminal >= 1);
    }

    #[test]
    fn test_greedy_table_matches_score() {
        let tables = Tables::new();
        let values = greedy_state_values(&tables);
        assert_eq!(values.pending_count(), 0);
        assert_eq!(values.entry(TERMINAL_SLOT), TableEntry::EndOfGame);
        assert_eq!(values.entry(0), TableEntry::Value(0.0));

        let ctx = QwixxContext::with_values(values);
        // 7 marks + lock on red clips to raw 56 and gains the 8-point offset.
        let board = Board::new()
            .with_row(Color::Red, 7, 12)
            .with_row(Color::Blue, 3, 6)
            .with_penalties(1);
        let position = Position::new(ctx.codec(), board).unwrap();
        assert!(position.rows[0] > CLIP_ROW);
        assert_eq!(
            ctx.continuation_value(&position).unwrap(),
            score(&board) as f32
        );
    }
}

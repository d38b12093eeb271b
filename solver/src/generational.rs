//! Generational engine: parallel value iteration over the raw state space.
//!
//! Unlike the backward pass in [`crate::state_computation`], this engine does
//! not depend on the Markov ordering. It keeps two full raw buffers
//! (62^4 · 5 slots each) and recomputes every slot of `next` from `prev`,
//! swapping after each generation, until nothing changes. Since every move
//! adds a mark or a penalty, values settle after at most one generation per
//! move in the longest game.
//!
//! Work is split statically: a dedicated rayon pool with `workers` threads,
//! each taking one contiguous chunk of `next`. Chunks never overlap and `prev`
//! is read-only during a generation, so no synchronization is needed beyond
//! the join.

use std::time::Instant;

use rayon::prelude::*;

use crate::constants::*;
use crate::error::Result;
use crate::game_mechanics::{is_game_over, score};
use crate::row_codec::RowCodec;
use crate::tables::Tables;
use crate::types::{Position, StateValues, TableEntry};
use crate::widget_solver::{ActionEvaluator, ValueSource};

const ROWS: usize = ROW_STATES;

/// Flat raw index: `penalties * 62^4 + red * 62^3 + yellow * 62^2 + green * 62 + blue`.
#[inline(always)]
pub fn raw_index(rows: &[u8; NUM_COLORS], penalties: u8) -> usize {
    let mut index = penalties as usize;
    for &row in rows {
        index = index * ROWS + row as usize;
    }
    index
}

/// Inverse of [`raw_index`].
#[inline(always)]
pub fn decode_raw(mut index: usize) -> ([u8; NUM_COLORS], u8) {
    let mut rows = [0u8; NUM_COLORS];
    for slot in rows.iter_mut().rev() {
        *slot = (index % ROWS) as u8;
        index /= ROWS;
    }
    (rows, index as u8)
}

/// A previous-generation raw buffer viewed as a value source.
pub struct RawValues<'a>(pub &'a [f32]);

impl ValueSource for RawValues<'_> {
    #[inline(always)]
    fn continuation_value(&self, position: &Position) -> Result<f32> {
        Ok(self.0[raw_index(&position.rows, position.board.penalties)])
    }
}

/// New value of one raw slot. Finished games hold their exact score.
pub fn raw_state_value<S: ValueSource + ?Sized>(
    codec: &RowCodec,
    source: &S,
    index: usize,
) -> Result<f32> {
    let (rows, penalties) = decode_raw(index);
    let origin = Position::from_rows(codec, rows, penalties);
    if is_game_over(&origin.board) {
        return Ok(score(&origin.board) as f32);
    }
    let ev = ActionEvaluator::new(codec, source, origin).expected_value()?;
    Ok(ev as f32)
}

/// Slots per worker so that `workers` chunks cover `total`.
#[inline]
pub fn chunk_len(total: usize, workers: usize) -> usize {
    total.div_ceil(workers.max(1)).max(1)
}

#[derive(Clone, Copy, Debug)]
pub struct GenerationalOptions {
    pub workers: usize,
    pub max_generations: usize,
}

impl Default for GenerationalOptions {
    fn default() -> Self {
        Self {
            workers: 8,
            max_generations: 100,
        }
    }
}

pub struct GenerationalResult {
    /// Final raw buffer (the last generation written).
    pub values: Vec<f32>,
    pub generations: usize,
    pub converged: bool,
}

/// Compute one generation for the slots `first..first + next.len()`.
///
/// `source` supplies the previous generation's continuation values and
/// `prev` holds the previous values of the same slots. Returns the number of
/// slots whose value changed bit-for-bit.
pub fn run_generation<S: ValueSource + Sync + ?Sized>(
    pool: &rayon::ThreadPool,
    codec: &RowCodec,
    source: &S,
    first: usize,
    prev: &[f32],
    next: &mut [f32],
    chunk: usize,
) -> Result<usize> {
    debug_assert_eq!(prev.len(), next.len());
    pool.install(|| {
        next.par_chunks_mut(chunk)
            .enumerate()
            .map(|(worker, slice)| -> Result<usize> {
                let base = worker * chunk;
                let mut changed = 0usize;
                for (offset, slot) in slice.iter_mut().enumerate() {
                    let local = base + offset;
                    let value = raw_state_value(codec, source, first + local)?;
                    if value.to_bits() != prev[local].to_bits() {
                        changed += 1;
                    }
                    *slot = value;
                }
                Ok(changed)
            })
            .try_reduce(|| 0, |a, b| Ok(a + b))
    })
}

/// Run `step` on swapped buffers until it reports no change or
/// `max_generations` is reached. After each step the new generation is in
/// `prev`. Returns the generation count and whether a fixed point was hit.
pub fn iterate_generations<F>(
    max_generations: usize,
    prev: &mut Vec<f32>,
    next: &mut Vec<f32>,
    mut step: F,
) -> Result<(usize, bool)>
where
    F: FnMut(&[f32], &mut [f32]) -> Result<usize>,
{
    let mut generations = 0;
    while generations < max_generations {
        let generation_start = Instant::now();
        let changed = step(prev.as_slice(), next.as_mut_slice())?;
        std::mem::swap(prev, next);
        generations += 1;

        log::info!(
            "Generation {} done in {:.1}s: {} slots changed | first slot = {:.4}",
            generations,
            generation_start.elapsed().as_secs_f64(),
            changed,
            prev.first().copied().unwrap_or(0.0)
        );
        if changed == 0 {
            return Ok((generations, true));
        }
    }
    Ok((generations, false))
}

/// Iterate generations over the full raw space until a fixed point or
/// `max_generations`.
pub fn run_generational(
    tables: &Tables,
    options: &GenerationalOptions,
) -> Result<GenerationalResult> {
    let workers = options.workers.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;
    let chunk = chunk_len(RAW_STATES, workers);

    log::info!("=== Starting Generational Computation ===");
    log::info!(
        "Raw states: {} ({:.0} MB per buffer), {} workers × {} slots",
        RAW_STATES,
        (RAW_STATES * std::mem::size_of::<f32>()) as f64 / (1024.0 * 1024.0),
        workers,
        chunk
    );

    let mut prev = vec![0.0f32; RAW_STATES];
    let mut next = vec![0.0f32; RAW_STATES];
    let total_start = Instant::now();

    let (generations, converged) =
        iterate_generations(options.max_generations, &mut prev, &mut next, |prev, next| {
            run_generation(&pool, &tables.codec, &RawValues(prev), 0, prev, next, chunk)
        })?;

    if converged {
        log::info!(
            "Converged after {} generations in {:.1}s",
            generations,
            total_start.elapsed().as_secs_f64()
        );
    } else {
        log::warn!(
            "Stopped after {} generations without reaching a fixed point",
            generations
        );
    }

    Ok(GenerationalResult {
        values: prev,
        generations,
        converged,
    })
}

/// Build a canonical table from any value source by reading each Markov
/// index's representative board.
pub fn project_to_canonical<S: ValueSource + Sync + ?Sized>(
    tables: &Tables,
    source: &S,
) -> Result<StateValues> {
    let mut values = vec![0.0f32; MARKOV_STATES];
    values
        .par_iter_mut()
        .enumerate()
        .try_for_each(|(index, slot)| -> Result<()> {
            let entry = match tables.symmetry.decode_markov(index) {
                None => TableEntry::EndOfGame,
                Some((rows, penalties)) => {
                    let position = Position::from_rows(&tables.codec, rows, penalties);
                    if is_game_over(&position.board) {
                        TableEntry::EndOfGame
                    } else {
                        TableEntry::Value(source.continuation_value(&position)?)
                    }
                }
            };
            *slot = entry.to_f32();
            Ok(())
        })?;
    Ok(StateValues::Owned(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverError;
    use crate::state_computation::greedy_state_values;
    use crate::types::{Board, Color};

    struct Zero;

    impl ValueSource for Zero {
        fn continuation_value(&self, _: &Position) -> Result<f32> {
            Ok(0.0)
        }
    }

    struct CurrentScore;

    impl ValueSource for CurrentScore {
        fn continuation_value(&self, position: &Position) -> Result<f32> {
            Ok(score(&position.board) as f32)
        }
    }

    #[test]
    fn test_raw_index_round_trip() {
        assert_eq!(raw_index(&[0, 0, 0, 0], 0), 0);
        assert_eq!(raw_index(&[61, 61, 61, 61], 4), RAW_STATES - 1);
        for index in (0..RAW_STATES).step_by(1_000_003) {
            let (rows, penalties) = decode_raw(index);
            assert_eq!(raw_index(&rows, penalties), index);
        }
        assert_eq!(raw_index(&[0, 0, 0, 1], 0), 1);
        assert_eq!(raw_index(&[1, 0, 0, 0], 0), 62 * 62 * 62);
    }

    #[test]
    fn test_chunks_cover_the_buffer() {
        for workers in [1, 3, 8, 13] {
            let chunk = chunk_len(RAW_STATES, workers);
            assert!(chunk * workers >= RAW_STATES);
            assert!(chunk * (workers - 1) < RAW_STATES);
        }
        assert_eq!(chunk_len(10, 0), 10);
    }

    #[test]
    fn test_first_generation_from_zero() {
        // With a zero continuation every roll has a live mark worth 0,
        // which beats the game-ending fourth penalty.
        let codec = RowCodec::new();
        let index = raw_index(&[0, 0, 0, 0], 3);
        assert_eq!(raw_state_value(&codec, &Zero, index).unwrap(), 0.0);
    }

    #[test]
    fn test_finished_raw_states_hold_their_score() {
        let codec = RowCodec::new();
        let board = Board::new().with_row(Color::Yellow, 3, 9).with_penalties(4);
        let position = Position::new(&codec, board).unwrap();
        let index = raw_index(&position.rows, 4);
        assert_eq!(raw_state_value(&codec, &Zero, index).unwrap(), -14.0);
    }

    #[test]
    fn test_generation_on_a_live_slice_from_zero() {
        // 30 live slots split over 3 workers: every mark is worth 0 and none
        // ends the game, so nothing moves.
        let codec = RowCodec::new();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(3).build().unwrap();
        let full_prev = vec![0.0f32; RAW_STATES];
        let mut next = vec![f32::NAN; 30];
        let changed = run_generation(
            &pool,
            &codec,
            &RawValues(&full_prev),
            0,
            &full_prev[..30],
            &mut next,
            chunk_len(30, 3),
        )
        .unwrap();
        assert_eq!(changed, 0);
        assert!(next.iter().all(|&v| v == 0.0), "{next:?}");
    }

    #[test]
    fn test_generation_writes_scores_into_finished_slots() {
        let codec = RowCodec::new();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(3).build().unwrap();
        // four penalties: every slot in this range is a finished game
        let first = raw_index(&[0, 0, 0, 0], MAX_PENALTIES);
        let prev = vec![0.0f32; 30];
        let mut next = vec![0.0f32; 30];
        let changed =
            run_generation(&pool, &codec, &Zero, first, &prev, &mut next, chunk_len(30, 3)).unwrap();

        let mut expected_changed = 0;
        for (offset, &value) in next.iter().enumerate() {
            let (rows, penalties) = decode_raw(first + offset);
            let board = Position::from_rows(&codec, rows, penalties).board;
            assert!(is_game_over(&board));
            assert_eq!(value, score(&board) as f32, "slot {}", first + offset);
            if value != 0.0 {
                expected_changed += 1;
            }
        }
        assert_eq!(next[0], -20.0);
        assert_eq!(changed, expected_changed);

        // rerunning against its own output changes nothing
        let again = next.clone();
        let changed =
            run_generation(&pool, &codec, &Zero, first, &again, &mut next, chunk_len(30, 3)).unwrap();
        assert_eq!(changed, 0);
    }

    #[test]
    fn test_iteration_stops_at_fixed_point() {
        let mut prev = vec![0.0f32; 4];
        let mut next = vec![0.0f32; 4];
        // each generation raises every slot by one, up to 3
        let (generations, converged) = iterate_generations(100, &mut prev, &mut next, |prev, next| {
            let mut changed = 0;
            for (p, n) in prev.iter().zip(next.iter_mut()) {
                *n = (p + 1.0).min(3.0);
                if n.to_bits() != p.to_bits() {
                    changed += 1;
                }
            }
            Ok(changed)
        })
        .unwrap();
        assert!(converged);
        assert_eq!(generations, 4);
        assert_eq!(prev, vec![3.0; 4]);
    }

    #[test]
    fn test_iteration_respects_generation_cap() {
        let mut prev = vec![0.0f32; 2];
        let mut next = vec![0.0f32; 2];
        let mut calls = 0;
        let (generations, converged) = iterate_generations(5, &mut prev, &mut next, |prev, next| {
            calls += 1;
            next[0] = prev[0] + 1.0;
            next[1] = prev[1];
            Ok(1)
        })
        .unwrap();
        assert!(!converged);
        assert_eq!((generations, calls), (5, 5));
        assert_eq!(prev[0], 5.0);

        let (generations, converged) =
            iterate_generations(0, &mut prev, &mut next, |_, _| Ok(0)).unwrap();
        assert_eq!((generations, converged), (0, false));
    }

    #[test]
    fn test_iteration_propagates_step_errors() {
        let mut prev = vec![0.0f32; 2];
        let mut next = vec![0.0f32; 2];
        let result = iterate_generations(10, &mut prev, &mut next, |_, _| Err(SolverError::GameOver));
        assert!(matches!(result, Err(SolverError::GameOver)));
    }

    #[test]
    fn test_projection_matches_greedy_table() {
        let tables = Tables::new();
        let projected = project_to_canonical(&tables, &CurrentScore).unwrap();
        let greedy = greedy_state_values(&tables);
        assert_eq!(projected.pending_count(), 0);
        for index in (0..MARKOV_STATES).step_by(4_099).chain([TERMINAL_SLOT]) {
            assert_eq!(projected.entry(index), greedy.entry(index), "index {index}");
        }
    }
}

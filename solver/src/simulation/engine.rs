//! Game simulation engine: plays N games following a value table.
//!
//! Each turn rolls all six dice, asks the advisory API for the best action and
//! applies it, until the game ends (fourth penalty or second locked row). With
//! a solved table the mean score converges to the empty-sheet value; with the
//! greedy table it measures the zero look-ahead baseline.

use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use crate::constants::*;
use crate::dice_mechanics::Roll;
use crate::error::Result;
use crate::game_mechanics::{is_game_over, locked_rows, score};
use crate::types::{Board, QwixxContext};

/// Outcome of one simulated game.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GameSummary {
    pub score: i32,
    pub turns: u32,
    pub penalties: u8,
    pub locked_rows: u8,
    pub marks: u32,
}

/// Results of a batch simulation.
#[derive(Clone, Debug, Serialize)]
pub struct SimulationResult {
    pub games: usize,
    pub seed: u64,
    #[serde(skip)]
    pub scores: Vec<i32>,
    pub mean: f64,
    pub std_dev: f64,
    pub min: i32,
    pub max: i32,
    pub median: i32,
    pub mean_turns: f64,
    /// Share of games ended by the fourth penalty.
    pub penalty_endings: f64,
    pub elapsed: Duration,
}

/// Roll all six dice.
#[inline(always)]
fn roll_dice(rng: &mut SmallRng) -> Result<Roll> {
    let mut white = [0u8; 2];
    for d in &mut white {
        *d = rng.random_range(1..=DIE_FACES);
    }
    let mut colored = [0u8; NUM_COLORS];
    for d in &mut colored {
        *d = rng.random_range(1..=DIE_FACES);
    }
    Roll::new(white, colored)
}

/// Play one game from the empty sheet.
pub fn simulate_game(ctx: &QwixxContext, rng: &mut SmallRng) -> Result<GameSummary> {
    let mut board = Board::new();
    let mut turns = 0u32;
    while !is_game_over(&board) {
        let roll = roll_dice(rng)?;
        let decision = ctx.best_action(&board, &roll)?;
        log::trace!("turn {}: {} -> {}", turns, decision.action, decision.board);
        board = decision.board;
        turns += 1;
    }
    Ok(GameSummary {
        score: score(&board),
        turns,
        penalties: board.penalties,
        locked_rows: locked_rows(&board) as u8,
        marks: board.total_marks(),
    })
}

/// Simulate N games in parallel, game `i` seeded with `seed + i`.
pub fn simulate_batch(ctx: &QwixxContext, num_games: usize, seed: u64) -> Result<SimulationResult> {
    let start = Instant::now();

    let games: Vec<GameSummary> = (0..num_games)
        .into_par_iter()
        .map(|i| {
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
            simulate_game(ctx, &mut rng)
        })
        .collect::<Result<_>>()?;

    let elapsed = start.elapsed();
    Ok(summarize(&games, seed, elapsed))
}

fn summarize(games: &[GameSummary], seed: u64, elapsed: Duration) -> SimulationResult {
    let n = games.len().max(1) as f64;
    let mut scores: Vec<i32> = games.iter().map(|g| g.score).collect();

    let mean = scores.iter().map(|&s| s as f64).sum::<f64>() / n;
    let variance = scores
        .iter()
        .map(|&s| (s as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let min = scores.iter().copied().min().unwrap_or(0);
    let max = scores.iter().copied().max().unwrap_or(0);

    scores.sort_unstable();
    let median = scores.get(scores.len() / 2).copied().unwrap_or(0);

    let mean_turns = games.iter().map(|g| g.turns as f64).sum::<f64>() / n;
    let penalty_endings = games
        .iter()
        .filter(|g| g.penalties >= MAX_PENALTIES)
        .count() as f64
        / n;

    SimulationResult {
        games: games.len(),
        seed,
        scores,
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
        median,
        mean_turns,
        penalty_endings,
        elapsed,
    }
}

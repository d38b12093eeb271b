//! # Qwixx: Optimal Single-Player Qwixx Solver
//!
//! Computes the expected final score under optimal play for every game state
//! of single-player Qwixx, using **backward induction** over ~5.5M canonical
//! states, and answers "what should I mark for this roll?" from the result.
//!
//! ## Algorithm overview
//!
//! | Phase | Rust module | Description |
//! |-------|-------------|-------------|
//! | 0 | [`tables`] | Build the row codec ([`row_codec`]) and the symmetry compressor ([`symmetry`]) |
//! | 1 | [`state_computation`] | Backward induction from the highest Markov index down to 0, one expectation per state |
//! | 1′ | [`generational`] | Alternative: parallel value iteration over the raw 62^4·5 space, projected back |
//! | 2 | [`api_computations`] | Advisory lookups: evaluate a board, pick the best action for a roll |
//!
//! Each state is solved by [`widget_solver::ActionEvaluator::expected_value`],
//! which enumerates the 21 sorted white pairs and, per color, the best option
//! for each colored die face, then merges the 6^4 colored outcomes.
//!
//! ## State representation
//!
//! A board is four rows plus a penalty count (0-4). Each row is reduced to a
//! (marks, rightmost value) pair and encoded as one of 62 row indices; the
//! descending rows are reflected so both families share one codec.
//!
//! Two exact symmetries shrink the table: rows of the same family are
//! interchangeable, and so are the two families. Rows locked with more than
//! six marks are clipped to index 56 and corrected by a fixed score offset.
//! The resulting Markov index is
//! `penalties * 1,367,031 + quad(pair(red, yellow), pair(green, blue))`, with
//! one extra slot for four penalties: 5,468,125 f32 entries (~21 MB).
//!
//! ## Differences from the printed rules
//!
//! - **Single player**: no opponents, so only the active player's options
//!   (white sum, then one white + one colored die) are modelled.
//! - **Lock bonus**: a lock counts as one extra mark, and a row may lock once
//!   it holds five marks.

#![allow(clippy::needless_range_loop)]

pub mod actions;
pub mod api_computations;
pub mod constants;
pub mod dice_mechanics;
pub mod env_config;
pub mod error;
pub mod game_mechanics;
pub mod generational;
pub mod row_codec;
pub mod simulation;
pub mod state_computation;
pub mod storage;
pub mod symmetry;
pub mod tables;
pub mod types;
pub mod widget_solver;

//! Game simulation and statistics.
//!
//! - [`engine`]: play N games following a value table

pub mod engine;

pub use engine::{simulate_batch, simulate_game, GameSummary, SimulationResult};

//! Core game types: grid, directions, move engine, RNG, errors, configuration.
//!
//! Everything here is independent of the search engines; `eval`, `expectimax`
//! and `mcts` build on these types.

pub mod config;
pub mod direction;
pub mod error;
pub mod grid;
pub mod moves;
pub mod rng;

pub use config::{AgentConfig, Strategy};
pub use direction::Direction;
pub use error::{GameError, Result};
pub use grid::{Grid, MAX_TILE};
pub use moves::{MoveEngine, MoveOutcome};
pub use rng::{GameRng, GameRngState, RandomSource};

//! # rust-2048
//!
//! Autonomous players for the tile-merging puzzle 2048.
//!
//! ## Design Principles
//!
//! 1. **Deterministic core**: moves, merges and scoring are pure functions of
//!    the grid; all randomness flows through an injected `RandomSource`.
//!
//! 2. **Clone-per-branch**: search branches own their grid copies, so nothing
//!    is shared between branches and Expectimax can fork root directions onto
//!    a thread pool.
//!
//! 3. **Configuration over code**: evaluation weights, search depth and
//!    simulation budgets are serde structs loadable from TOML.
//!
//! ## Modules
//!
//! - `core`: Grid, directions, move engine, RNG, errors, configuration
//! - `eval`: Weighted-feature evaluation of grids
//! - `expectimax`: Depth-limited MAX/CHANCE search
//! - `mcts`: Monte Carlo Tree Search with UCT selection
//! - `agent`: The `SearchEngine` trait shared by both engines
//!
//! ## Example
//!
//! ```
//! use rust_2048::{Agent, AgentConfig};
//!
//! let mut config = AgentConfig::default();
//! config.expectimax.depth = 2;
//!
//! let mut agent = Agent::new(&config);
//! let mut grid = agent.new_grid(4, 4).unwrap();
//! let (direction, outcome) = agent.step(&mut grid).unwrap();
//! assert!(outcome.valid);
//! println!("played {direction}\n{grid}");
//! ```

pub mod agent;
pub mod core;
pub mod eval;
pub mod expectimax;
pub mod mcts;

#[cfg(feature = "python")]
mod python;

// Re-export commonly used types
pub use crate::core::{
    AgentConfig, Direction, GameError, GameRng, GameRngState, Grid, MoveEngine, MoveOutcome,
    RandomSource, Result, Strategy,
};

pub use crate::eval::{EvalConfig, EvaluationFunction, Feature};

pub use crate::expectimax::{BranchEval, ChanceModel, ExpectimaxConfig, ExpectimaxSearch};

pub use crate::mcts::{MCTSConfig, MCTSSearch, MCTSTree, NodeId, SearchBudget, SearchStats};

pub use crate::agent::{build_engine, Agent, SearchEngine};

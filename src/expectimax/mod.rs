//! Expectimax search over the 2048 game tree.
//!
//! The tree alternates MAX nodes (the player picks a direction) with
//! CHANCE nodes (a tile spawns in a random empty cell). Leaves and
//! terminal grids are scored by the configured `EvaluationFunction`.

pub mod config;
pub mod search;

pub use config::{ChanceModel, ExpectimaxConfig};
pub use search::{BranchEval, ExpectimaxSearch, ExpectimaxStats};

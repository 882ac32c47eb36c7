//! Monte Carlo Tree Search for 2048.
//!
//! ## Overview
//!
//! - **Arena tree**: nodes live in a flat vector and point at their parent by
//!   index, so backpropagation walks up in O(1) per step
//! - **One child per expansion**: a random valid move from the selected node
//! - **Random rollouts** scored by a configurable `EvaluationFunction`
//! - **Tree reuse**: the chosen child becomes the next root
//! - **Budgeted**: simulation count plus optional deadline, checked between cycles
//!
//! ## Usage
//!
//! ```rust
//! use rust_2048::core::{GameRng, Grid};
//! use rust_2048::mcts::{MCTSConfig, MCTSSearch};
//!
//! let mut rng = GameRng::new(7);
//! let grid = Grid::new(4, 4, &mut rng).unwrap();
//!
//! let mut search = MCTSSearch::new(MCTSConfig::default().with_simulations(100));
//! let direction = search.choose_move(&grid).unwrap();
//! println!("{direction}: {:?}", search.visit_counts());
//! ```
//!
//! ## Custom Policies
//!
//! ```rust,ignore
//! use rust_2048::mcts::{MCTSSearch, MCTSConfig};
//!
//! let search = MCTSSearch::new(config).with_rollout(MyGreedyRollout);
//! ```

pub mod config;
pub mod node;
pub mod policy;
pub mod search;
pub mod stats;
pub mod tree;

// Re-export main types
pub use config::MCTSConfig;
pub use node::{MCTSNode, NodeId};
pub use policy::{RandomRollout, RolloutPolicy, SelectionPolicy, Uct};
pub use search::{MCTSSearch, SearchBudget};
pub use stats::SearchStats;
pub use tree::{MCTSTree, TreeStats};

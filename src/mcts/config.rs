//! Knobs for `MCTSSearch`.

use serde::{Deserialize, Serialize};

use crate::eval::EvalConfig;

/// Loadable from the `[mcts]` table of an agent TOML file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MCTSConfig {
    /// `c` in the UCT formula.
    pub exploration_constant: f64,

    /// Simulations per move decision.
    pub n_sim: u32,

    /// Depth (relative to the root) beyond which nodes are evaluated
    /// in place instead of expanded.
    pub max_depth: u32,

    /// Seeds expansion and rollout choices.
    pub seed: u64,

    /// Optional wall-clock cap per move decision, in milliseconds.
    /// Checked between simulations only.
    pub time_limit_ms: Option<u64>,

    /// Keep the chosen child's subtree for the next decision.
    pub reuse_tree: bool,

    /// Weights for evaluating rollout results.
    pub evaluation: EvalConfig,
}

impl Default for MCTSConfig {
    fn default() -> Self {
        Self {
            exploration_constant: 1.41,
            n_sim: 300,
            max_depth: 100,
            seed: 42,
            time_limit_ms: None,
            reuse_tree: true,
            evaluation: EvalConfig::mcts(),
        }
    }
}

impl MCTSConfig {
    #[must_use]
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    #[must_use]
    pub fn with_simulations(mut self, n_sim: u32) -> Self {
        self.n_sim = n_sim;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub fn with_time_limit_ms(mut self, limit: u64) -> Self {
        self.time_limit_ms = Some(limit);
        self
    }

    /// Enable or disable tree reuse between decisions.
    #[must_use]
    pub fn with_tree_reuse(mut self, reuse: bool) -> Self {
        self.reuse_tree = reuse;
        self
    }

    /// Set the rollout evaluation weights.
    #[must_use]
    pub fn with_evaluation(mut self, evaluation: EvalConfig) -> Self {
        self.evaluation = evaluation;
        self
    }
}

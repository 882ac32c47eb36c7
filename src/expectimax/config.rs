//! Expectimax configuration parameters.

use serde::{Deserialize, Serialize};

use crate::eval::EvalConfig;

/// How a chance node averages over random tile spawns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanceModel {
    /// Each empty cell gets a 2 (weight 0.9) and a 4 (weight 0.1).
    #[default]
    Weighted,
    /// Each empty cell gets a 2 only; half the branching of `Weighted`.
    TwosOnly,
}

/// Expectimax configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectimaxConfig {
    /// Search depth in plies; MAX and CHANCE layers each consume one.
    pub depth: u32,

    /// Spawn model used by chance nodes.
    pub chance_model: ChanceModel,

    /// Search the root directions on the rayon pool.
    pub parallel: bool,

    /// Leaf evaluation weights.
    pub evaluation: EvalConfig,
}

impl Default for ExpectimaxConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            chance_model: ChanceModel::Weighted,
            parallel: true,
            evaluation: EvalConfig::expectimax(),
        }
    }
}

impl ExpectimaxConfig {
    /// Set the search depth.
    #[must_use]
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Set the chance model.
    #[must_use]
    pub fn with_chance_model(mut self, model: ChanceModel) -> Self {
        self.chance_model = model;
        self
    }

    /// Enable or disable root parallelism.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the evaluation weights.
    #[must_use]
    pub fn with_evaluation(mut self, evaluation: EvalConfig) -> Self {
        self.evaluation = evaluation;
        self
    }
}

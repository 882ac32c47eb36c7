//! Per-decision counters.

use serde::{Deserialize, Serialize};

/// Counters for one `MCTSSearch` decision, reset at the start of each.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Select/expand/simulate/backpropagate cycles run.
    pub simulations: u32,

    /// Children added to the tree.
    pub nodes_expanded: u32,

    /// Cycles that hit the depth cap and evaluated the node in place.
    pub depth_capped: u32,

    /// Deepest node selected, relative to the root.
    pub max_depth: u32,

    /// Whether the previous tree was reused for this decision.
    pub reused_tree: bool,

    /// Wall-clock time in microseconds.
    pub time_us: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn simulations_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            self.simulations as f64 / (self.time_us as f64 / 1_000_000.0)
        }
    }

    /// Fraction of cycles that expanded a node.
    #[must_use]
    pub fn expansion_ratio(&self) -> f64 {
        if self.simulations == 0 {
            0.0
        } else {
            self.nodes_expanded as f64 / self.simulations as f64
        }
    }
}

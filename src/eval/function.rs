//! Weighted-sum evaluation of a grid.

use serde::{Deserialize, Serialize};

use crate::core::grid::Grid;

use super::config::{EvalConfig, Feature};
use super::features;

/// Stateless scorer: `Σ weight(f) · f(grid)` over the configured features.
///
/// Higher is better. Evaluation never mutates the grid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationFunction {
    config: EvalConfig,
}

impl EvaluationFunction {
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// The weights and thresholds in use.
    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Score a grid.
    ///
    /// `last_move_score` feeds `MoveScore`; when `None`, the grid's own
    /// last-move score is used.
    #[must_use]
    pub fn evaluate(&self, grid: &Grid, last_move_score: Option<u64>) -> f64 {
        let last = last_move_score.or(grid.last_move_score());
        self.config
            .weights
            .iter()
            .filter(|(_, w)| **w != 0.0)
            .map(|(&feature, &w)| w * self.feature_value(feature, grid, last))
            .sum()
    }

    /// Raw (unweighted) value of one feature.
    #[must_use]
    pub fn feature_value(&self, feature: Feature, grid: &Grid, last_move_score: Option<u64>) -> f64 {
        let threshold = self.config.threshold(feature);
        match feature {
            Feature::Zeros => features::zeros(grid),
            Feature::Monotonicity => features::monotonicity(grid),
            Feature::Smoothness => features::smoothness(grid),
            Feature::Pairs => features::pairs(grid, self.config.pair_values.as_deref()),
            Feature::HighValuesOnEdge => features::high_values_on_edge(grid, threshold),
            Feature::HighValuesInCorner => features::high_values_in_corner(grid, threshold),
            Feature::HigherOnEdge => features::higher_on_edge(grid),
            Feature::HighToLow => features::high_to_low(grid, threshold),
            Feature::LowToHigh => features::low_to_high(grid, threshold),
            Feature::ZeroField => features::zero_field(grid),
            Feature::MoveScore => features::move_score(last_move_score),
            Feature::CumulativeScore => features::cumulative_score(grid),
            Feature::Flatness => features::flatness(grid),
            Feature::MaxTile => features::max_tile(grid),
            Feature::TileSum => features::tile_sum(grid),
            Feature::MergePotential => features::merge_potential(grid),
        }
    }

    /// Weighted contribution of each configured feature.
    #[must_use]
    pub fn breakdown(&self, grid: &Grid, last_move_score: Option<u64>) -> Vec<(Feature, f64)> {
        let last = last_move_score.or(grid.last_move_score());
        self.config
            .weights
            .iter()
            .map(|(&feature, &w)| (feature, w * self.feature_value(feature, grid, last)))
            .collect()
    }
}

impl From<EvalConfig> for EvaluationFunction {
    fn from(config: EvalConfig) -> Self {
        Self::new(config)
    }
}

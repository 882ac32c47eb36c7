//! Evaluation configuration: feature weights and thresholds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::features::DEFAULT_THRESHOLD;

/// A weighted term of the evaluation function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Zeros,
    Monotonicity,
    Smoothness,
    Pairs,
    HighValuesOnEdge,
    HighValuesInCorner,
    HigherOnEdge,
    HighToLow,
    LowToHigh,
    ZeroField,
    MoveScore,
    CumulativeScore,
    Flatness,
    MaxTile,
    TileSum,
    MergePotential,
}

impl Feature {
    /// Every feature, in declaration order.
    pub const ALL: [Feature; 16] = [
        Feature::Zeros,
        Feature::Monotonicity,
        Feature::Smoothness,
        Feature::Pairs,
        Feature::HighValuesOnEdge,
        Feature::HighValuesInCorner,
        Feature::HigherOnEdge,
        Feature::HighToLow,
        Feature::LowToHigh,
        Feature::ZeroField,
        Feature::MoveScore,
        Feature::CumulativeScore,
        Feature::Flatness,
        Feature::MaxTile,
        Feature::TileSum,
        Feature::MergePotential,
    ];

    /// Config key for this feature.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Feature::Zeros => "zeros",
            Feature::Monotonicity => "monotonicity",
            Feature::Smoothness => "smoothness",
            Feature::Pairs => "pairs",
            Feature::HighValuesOnEdge => "high_values_on_edge",
            Feature::HighValuesInCorner => "high_values_in_corner",
            Feature::HigherOnEdge => "higher_on_edge",
            Feature::HighToLow => "high_to_low",
            Feature::LowToHigh => "low_to_high",
            Feature::ZeroField => "zero_field",
            Feature::MoveScore => "move_score",
            Feature::CumulativeScore => "cumulative_score",
            Feature::Flatness => "flatness",
            Feature::MaxTile => "max_tile",
            Feature::TileSum => "tile_sum",
            Feature::MergePotential => "merge_potential",
        }
    }

    /// Whether the feature reads a threshold.
    #[must_use]
    pub const fn uses_threshold(self) -> bool {
        matches!(
            self,
            Feature::HighValuesOnEdge | Feature::HighValuesInCorner | Feature::HighToLow | Feature::LowToHigh
        )
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("Unknown feature: {}", s))
    }
}

/// Weights, thresholds and the pair filter of an evaluation function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Feature → weight. Features without an entry do not contribute.
    pub weights: BTreeMap<Feature, f64>,

    /// Feature → "high value" divider, for threshold features.
    pub thresholds: BTreeMap<Feature, u32>,

    /// Divider used when a threshold feature has no entry.
    pub default_threshold: u32,

    /// Tile values counted by `Pairs` (`None` = all).
    pub pair_values: Option<Vec<u32>>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self::expectimax()
    }
}

impl EvalConfig {
    /// No weights at all; every grid evaluates to 0.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            weights: BTreeMap::new(),
            thresholds: BTreeMap::new(),
            default_threshold: DEFAULT_THRESHOLD,
            pair_values: None,
        }
    }

    /// Weights tuned for the Expectimax player.
    #[must_use]
    pub fn expectimax() -> Self {
        Self::empty()
            .with_weight(Feature::MoveScore, 1.0)
            .with_weight(Feature::CumulativeScore, 1.0)
            .with_weight(Feature::Zeros, 32.0)
            .with_weight(Feature::Pairs, 0.4)
            .with_weight(Feature::LowToHigh, 10.0)
            .with_threshold(Feature::LowToHigh, 64)
            .with_weight(Feature::ZeroField, 102.4)
            .with_weight(Feature::Monotonicity, 0.2)
            .with_weight(Feature::HighValuesOnEdge, 10.0)
            .with_threshold(Feature::HighValuesOnEdge, 512)
    }

    /// Weights tuned for the MCTS player's terminal evaluations.
    #[must_use]
    pub fn mcts() -> Self {
        Self::empty()
            .with_weight(Feature::MoveScore, 0.5)
            .with_weight(Feature::Zeros, 2.0)
            .with_weight(Feature::HigherOnEdge, 1.0)
    }

    /// Set the weight of a feature.
    #[must_use]
    pub fn with_weight(mut self, feature: Feature, weight: f64) -> Self {
        self.weights.insert(feature, weight);
        self
    }

    /// Set the divider of a threshold feature.
    #[must_use]
    pub fn with_threshold(mut self, feature: Feature, threshold: u32) -> Self {
        self.thresholds.insert(feature, threshold);
        self
    }

    /// Restrict `Pairs` to the given tile values.
    #[must_use]
    pub fn with_pair_values(mut self, values: Vec<u32>) -> Self {
        self.pair_values = Some(values);
        self
    }

    /// Weight of a feature (0 if absent).
    #[must_use]
    pub fn weight(&self, feature: Feature) -> f64 {
        self.weights.get(&feature).copied().unwrap_or(0.0)
    }

    /// Divider for a feature.
    #[must_use]
    pub fn threshold(&self, feature: Feature) -> u32 {
        self.thresholds.get(&feature).copied().unwrap_or(self.default_threshold)
    }
}

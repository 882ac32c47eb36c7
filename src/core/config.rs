//! Agent configuration and its TOML loader.
//!
//! Every section falls back to its defaults, so a file only needs the keys
//! it changes:
//!
//! ```toml
//! strategy = "mcts"
//! seed = 7
//!
//! [mcts]
//! n_sim = 500
//!
//! [expectimax.evaluation.weights]
//! zeros = 16.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::{GameError, Result};
use crate::expectimax::ExpectimaxConfig;
use crate::mcts::MCTSConfig;

/// Which search engine picks the moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Expectimax,
    Mcts,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Expectimax => write!(f, "expectimax"),
            Strategy::Mcts => write!(f, "mcts"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "expectimax" => Ok(Strategy::Expectimax),
            "mcts" => Ok(Strategy::Mcts),
            _ => Err(format!("Unknown strategy: {}", s)),
        }
    }
}

/// Top-level configuration of an agent: board shape, seed and engine settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Board width (columns).
    pub width: usize,

    /// Board height (rows).
    pub height: usize,

    /// Seed for the game RNG (tile spawns).
    pub seed: u64,

    /// Engine used to choose moves.
    pub strategy: Strategy,

    pub expectimax: ExpectimaxConfig,

    pub mcts: MCTSConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            width: 4,
            height: 4,
            seed: 42,
            strategy: Strategy::Expectimax,
            expectimax: ExpectimaxConfig::default(),
            mcts: MCTSConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Set the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the board dimensions.
    #[must_use]
    pub fn with_dimensions(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the game seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AgentConfig = toml::from_str(content).map_err(|e| GameError::Config(e.to_string()))?;
        config.validate()?;
        debug!(strategy = %config.strategy, width = config.width, height = config.height, "parsed agent config");
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            warn!("Failed to read {}: {}", path.display(), e);
            GameError::Config(format!("{}: {}", path.display(), e))
        })?;
        info!("Loading config from {}", path.display());
        Self::from_toml_str(&content).map_err(|e| {
            warn!("Failed to parse {}: {}", path.display(), e);
            e
        })
    }

    /// Load `path` if it exists and parses, else fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config at {}, using built-in defaults", path.display());
            return Self::default();
        }
        Self::load_from_path(path).unwrap_or_else(|_| Self::default())
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| GameError::Config(e.to_string()))
    }

    /// Reject settings no game can be played with.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.mcts.exploration_constant.is_finite() && self.mcts.exploration_constant >= 0.0) {
            return Err(GameError::Config(format!(
                "exploration_constant must be a non-negative number, got {}",
                self.mcts.exploration_constant
            )));
        }
        Ok(())
    }
}

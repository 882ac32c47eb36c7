//! Depth-limited Expectimax search.
//!
//! MAX nodes pick the best direction; CHANCE nodes average over every
//! possible tile spawn. Each branch works on its own grid clone, so the
//! root directions can be searched in parallel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::grid::{Grid, TWO_PROBABILITY};
use crate::core::{Direction, GameError, MoveEngine, Result};
use crate::eval::EvaluationFunction;

use super::config::{ChanceModel, ExpectimaxConfig};

/// Value of one root direction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BranchEval {
    pub direction: Direction,
    /// Expected value; `NEG_INFINITY` for invalid moves.
    pub value: f64,
    pub valid: bool,
}

/// Statistics from the last root search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectimaxStats {
    /// MAX and CHANCE nodes expanded.
    pub nodes: u64,
    /// Grids passed to the evaluation function.
    pub leaves: u64,
    /// Total time spent searching (microseconds).
    pub time_us: u64,
}

#[derive(Default)]
struct Counters {
    nodes: AtomicU64,
    leaves: AtomicU64,
}

/// Expectimax search context.
#[derive(Clone, Debug)]
pub struct ExpectimaxSearch {
    config: ExpectimaxConfig,
    eval: EvaluationFunction,
    stats: ExpectimaxStats,
}

impl Default for ExpectimaxSearch {
    fn default() -> Self {
        Self::new(ExpectimaxConfig::default())
    }
}

impl ExpectimaxSearch {
    pub fn new(config: ExpectimaxConfig) -> Self {
        let eval = EvaluationFunction::new(config.evaluation.clone());
        Self {
            config,
            eval,
            stats: ExpectimaxStats::default(),
        }
    }

    /// Pick the direction with the highest expected value.
    ///
    /// Ties go to the earliest direction in `Direction::ALL`. Fails with
    /// `NoValidMove` on a terminal grid.
    pub fn choose_move(&mut self, grid: &Grid) -> Result<Direction> {
        if grid.is_terminal() {
            return Err(GameError::NoValidMove);
        }
        let branches = self.branch_evals(grid);
        let best = best_branch(&branches).ok_or(GameError::NoValidMove)?;
        debug!(
            direction = %best.direction,
            value = best.value,
            nodes = self.stats.nodes,
            "expectimax chose move"
        );
        Ok(best.direction)
    }

    /// Evaluate every root direction, in `Direction::ALL` order.
    pub fn branch_evals(&mut self, grid: &Grid) -> [BranchEval; 4] {
        let start = Instant::now();
        let counters = Counters::default();
        let depth = self.config.depth;

        let this = &*self;
        let branch = |dir: Direction| this.root_branch(grid, dir, depth, &counters);
        let evals: Vec<BranchEval> = if self.config.parallel {
            Direction::ALL.par_iter().map(|&dir| branch(dir)).collect()
        } else {
            Direction::ALL.iter().map(|&dir| branch(dir)).collect()
        };

        self.stats = ExpectimaxStats {
            nodes: counters.nodes.load(Ordering::Relaxed),
            leaves: counters.leaves.load(Ordering::Relaxed),
            time_us: start.elapsed().as_micros() as u64,
        };

        let mut out = Direction::ALL.map(|direction| BranchEval { direction, value: f64::NEG_INFINITY, valid: false });
        for eval in evals {
            out[eval.direction.index()] = eval;
        }
        out
    }

    /// Value of `grid` as a MAX node with `depth` plies remaining.
    ///
    /// At depth 0 this is exactly the evaluation of `grid`.
    #[must_use]
    pub fn expectimax(&self, grid: &Grid, depth: u32) -> f64 {
        self.max_node(grid, depth, &Counters::default())
    }

    /// Statistics from the last call to `choose_move` or `branch_evals`.
    #[must_use]
    pub fn stats(&self) -> ExpectimaxStats {
        self.stats
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &ExpectimaxConfig {
        &self.config
    }

    /// The leaf evaluation function.
    #[must_use]
    pub fn evaluation(&self) -> &EvaluationFunction {
        &self.eval
    }

    fn root_branch(&self, grid: &Grid, direction: Direction, depth: u32, counters: &Counters) -> BranchEval {
        let (child, outcome) = MoveEngine::preview(grid, direction);
        if !outcome.valid {
            return BranchEval { direction, value: f64::NEG_INFINITY, valid: false };
        }
        let value = self.move_value(&child, depth, counters);
        trace!(%direction, value, "expectimax root branch");
        BranchEval { direction, value, valid: true }
    }

    fn leaf(&self, grid: &Grid, counters: &Counters) -> f64 {
        counters.leaves.fetch_add(1, Ordering::Relaxed);
        self.eval.evaluate(grid, None)
    }

    /// Value of a grid just produced by a valid move at a `depth` MAX node.
    fn move_value(&self, child: &Grid, depth: u32, counters: &Counters) -> f64 {
        if depth == 0 || child.is_terminal() {
            self.leaf(child, counters)
        } else {
            self.chance_node(child, depth - 1, counters)
        }
    }

    fn max_node(&self, grid: &Grid, depth: u32, counters: &Counters) -> f64 {
        if depth == 0 || grid.is_terminal() {
            return self.leaf(grid, counters);
        }
        counters.nodes.fetch_add(1, Ordering::Relaxed);

        let mut best: Option<f64> = None;
        for direction in Direction::ALL {
            let (child, outcome) = MoveEngine::preview(grid, direction);
            if !outcome.valid {
                continue;
            }
            let value = self.move_value(&child, depth, counters);
            if best.map_or(true, |b| value > b) {
                best = Some(value);
            }
        }
        match best {
            Some(value) => value,
            None => self.leaf(grid, counters),
        }
    }

    fn chance_node(&self, grid: &Grid, depth: u32, counters: &Counters) -> f64 {
        if depth == 0 {
            return self.leaf(grid, counters);
        }
        counters.nodes.fetch_add(1, Ordering::Relaxed);

        let empty = grid.empty_cells();
        if empty.is_empty() {
            return 0.0;
        }

        let mut total = 0.0;
        for &(row, col) in &empty {
            total += match self.config.chance_model {
                ChanceModel::Weighted => {
                    TWO_PROBABILITY * self.spawn_value(grid, row, col, 2, depth, counters)
                        + (1.0 - TWO_PROBABILITY) * self.spawn_value(grid, row, col, 4, depth, counters)
                }
                ChanceModel::TwosOnly => self.spawn_value(grid, row, col, 2, depth, counters),
            };
        }
        total / empty.len() as f64
    }

    fn spawn_value(&self, grid: &Grid, row: usize, col: usize, tile: u32, depth: u32, counters: &Counters) -> f64 {
        let mut next = grid.clone();
        next.cells_mut()[row * grid.width() + col] = tile;
        self.max_node(&next, depth - 1, counters)
    }
}

/// Highest-valued valid branch; the earliest wins ties.
fn best_branch(branches: &[BranchEval]) -> Option<BranchEval> {
    branches.iter().filter(|b| b.valid).fold(None, |best: Option<BranchEval>, b| match best {
        Some(current) if current.value >= b.value => Some(current),
        _ => Some(*b),
    })
}

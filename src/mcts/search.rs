//! The MCTS decision loop.
//!
//! Each simulation selects down the tree by UCT, expands the selected node
//! with one random valid move, plays the new grid out randomly and adds the
//! evaluation of the final grid to the selected node and its ancestors.
//! The new child is first credited by the next simulation that passes
//! through it.

use std::time::{Duration, Instant};

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::{Direction, GameError, GameRng, Grid, Result};
use crate::eval::EvaluationFunction;

use super::config::MCTSConfig;
use super::node::{MCTSNode, NodeId};
use super::policy::{random_direction, RandomRollout, RolloutPolicy, SelectionPolicy, Uct};
use super::stats::SearchStats;
use super::tree::MCTSTree;

/// Remaining work for one move decision.
///
/// Checked before each select/expand/simulate/backpropagate cycle, never
/// in the middle of one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchBudget {
    remaining: u32,
    deadline: Option<Instant>,
}

impl SearchBudget {
    /// Budget of `n` simulations with no deadline.
    #[must_use]
    pub fn simulations(n: u32) -> Self {
        Self {
            remaining: n,
            deadline: None,
        }
    }

    /// Stop once `deadline` has passed.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Stop once `limit` has elapsed from now.
    #[must_use]
    pub fn with_time_limit(self, limit: Duration) -> Self {
        self.with_deadline(Instant::now() + limit)
    }

    /// Budget described by a config: `n_sim` plus the optional time limit.
    #[must_use]
    pub fn from_config(config: &MCTSConfig) -> Self {
        let budget = Self::simulations(config.n_sim);
        match config.time_limit_ms {
            Some(ms) => budget.with_time_limit(Duration::from_millis(ms)),
            None => budget,
        }
    }

    /// Simulations left.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Check whether another cycle may start.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0 || self.deadline.map_or(false, |d| Instant::now() >= d)
    }

    fn consume(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

/// Main MCTS search context.
///
/// Owns the search tree, which survives between decisions when tree reuse
/// is enabled.
pub struct MCTSSearch {
    /// Search configuration.
    config: MCTSConfig,

    /// Evaluation of rollout results.
    eval: EvaluationFunction,

    /// The search tree (None before the first search).
    tree: Option<MCTSTree>,

    /// RNG for expansion and rollouts.
    rng: GameRng,

    /// Selection policy.
    selection: Box<dyn SelectionPolicy>,

    /// Rollout policy.
    rollout: Box<dyn RolloutPolicy>,

    /// Search statistics.
    stats: SearchStats,

    /// Root child visit counts from the last decision.
    last_visits: Vec<(Direction, u32)>,
}

impl Default for MCTSSearch {
    fn default() -> Self {
        Self::new(MCTSConfig::default())
    }
}

impl MCTSSearch {
    /// Create a new MCTS search context.
    pub fn new(config: MCTSConfig) -> Self {
        let eval = EvaluationFunction::new(config.evaluation.clone());
        let rng = GameRng::new(config.seed);

        Self {
            config,
            eval,
            tree: None,
            rng,
            selection: Box::new(Uct),
            rollout: Box::new(RandomRollout),
            stats: SearchStats::default(),
            last_visits: Vec::new(),
        }
    }

    /// Set a custom selection policy.
    pub fn with_selection<S: SelectionPolicy + 'static>(mut self, selection: S) -> Self {
        self.selection = Box::new(selection);
        self
    }

    /// Set a custom rollout policy.
    pub fn with_rollout<P: RolloutPolicy + 'static>(mut self, rollout: P) -> Self {
        self.rollout = Box::new(rollout);
        self
    }

    /// Pick a direction for `grid` using the configured budget.
    ///
    /// Fails with `NoValidMove` on a terminal grid.
    pub fn choose_move(&mut self, grid: &Grid) -> Result<Direction> {
        let budget = SearchBudget::from_config(&self.config);
        self.search(grid, budget)
    }

    /// Pick a direction for `grid`, running at most `budget` simulations.
    ///
    /// The most visited root child wins (earliest child on ties). With tree
    /// reuse it becomes the root for the next decision.
    pub fn search(&mut self, grid: &Grid, budget: SearchBudget) -> Result<Direction> {
        if grid.is_terminal() {
            return Err(GameError::NoValidMove);
        }
        let start = Instant::now();
        self.run_simulations(grid, budget);

        let mut tree = self.tree.take().ok_or(GameError::NoValidMove)?;
        self.last_visits = visit_counts(&tree);

        let shape = tree.stats();
        let best = most_visited_child(&tree);
        let direction = match best.and_then(|child| tree.get(child).direction.map(|d| (child, d))) {
            Some((child, direction)) => {
                if self.config.reuse_tree {
                    tree.promote(child);
                    self.tree = Some(tree);
                }
                direction
            }
            None => {
                // Nothing was expanded; no subtree worth keeping.
                grid.valid_moves().first().copied().ok_or(GameError::NoValidMove)?
            }
        };

        self.stats.time_us = start.elapsed().as_micros() as u64;
        debug!(
            %direction,
            simulations = self.stats.simulations,
            visits = ?self.last_visits,
            reused = self.stats.reused_tree,
            nodes = shape.node_count,
            branching = shape.branching_factor(),
            sims_per_sec = self.stats.simulations_per_second(),
            expansion_ratio = self.stats.expansion_ratio(),
            "mcts chose move"
        );
        Ok(direction)
    }

    /// Run simulations from `grid` without choosing a move.
    ///
    /// Returns the number of simulations completed.
    pub fn run_simulations(&mut self, grid: &Grid, mut budget: SearchBudget) -> u32 {
        let start = Instant::now();
        self.stats.reset();
        let mut tree = self.prepare_root(grid);

        while !budget.is_exhausted() {
            self.simulate_once(&mut tree);
            budget.consume();
            self.stats.simulations += 1;
        }

        self.tree = Some(tree);
        self.stats.time_us = start.elapsed().as_micros() as u64;
        self.stats.simulations
    }

    /// Drop the tree and reseed the RNG from the config.
    pub fn reset(&mut self) {
        self.tree = None;
        self.rng = GameRng::new(self.config.seed);
        self.stats.reset();
        self.last_visits.clear();
    }

    /// Reuse the retained tree if its root matches `grid`, else start fresh.
    fn prepare_root(&mut self, grid: &Grid) -> MCTSTree {
        match self.tree.take() {
            Some(tree) if self.config.reuse_tree && same_tiles(&tree.root_node().grid, grid) => {
                self.stats.reused_tree = true;
                tree
            }
            Some(mut stale) => {
                stale.reset(grid.clone());
                stale
            }
            None => MCTSTree::new(grid.clone()),
        }
    }

    /// One select/expand/simulate/backpropagate cycle.
    fn simulate_once(&mut self, tree: &mut MCTSTree) {
        let mut node = tree.root();
        while let Some(child) = self.selection.select(tree, node, self.config.exploration_constant) {
            node = child;
        }

        let score = if tree.get(node).depth < self.config.max_depth {
            let child = self.expand(tree, node);
            let mut grid = tree.get(child).grid.clone();
            self.rollout.rollout(&mut grid, &mut self.rng);
            self.eval.evaluate(&grid, None)
        } else {
            self.stats.depth_capped += 1;
            self.eval.evaluate(&tree.get(node).grid, None)
        };

        trace!(node = %node, depth = tree.get(node).depth, score, "mcts simulation");
        backpropagate(tree, node, score);
    }

    /// Add one child to `node`: random directions until one is valid or
    /// the grid is terminal.
    fn expand(&mut self, tree: &mut MCTSTree, node: NodeId) -> NodeId {
        let mut grid = tree.get(node).grid.clone();
        let direction = loop {
            let direction = random_direction(&mut self.rng);
            let outcome = grid.play(direction, &mut self.rng);
            if outcome.valid || grid.is_terminal() {
                break direction;
            }
        };

        let child = tree.add_child(node, MCTSNode::new(grid, Some(direction), node, 0));
        self.stats.nodes_expanded += 1;
        self.stats.max_depth = self.stats.max_depth.max(tree.get(child).depth);
        child
    }

    /// Get search statistics.
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Get the search tree.
    #[must_use]
    pub fn tree(&self) -> Option<&MCTSTree> {
        self.tree.as_ref()
    }

    /// Root child visit counts from the last decision, in creation order.
    #[must_use]
    pub fn visit_counts(&self) -> &[(Direction, u32)] {
        &self.last_visits
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &MCTSConfig {
        &self.config
    }
}

/// Add `score` to `node` and every ancestor, bumping their visit counts.
fn backpropagate(tree: &mut MCTSTree, node: NodeId, score: f64) {
    let path: SmallVec<[NodeId; 32]> = tree.ancestors(node).collect();
    for id in path {
        let n = tree.get_mut(id);
        n.visits += 1;
        n.value += score;
    }
}

fn most_visited_child(tree: &MCTSTree) -> Option<NodeId> {
    let mut best: Option<(NodeId, u32)> = None;
    for &child in &tree.root_node().children {
        let visits = tree.get(child).visits;
        if best.map_or(true, |(_, b)| visits > b) {
            best = Some((child, visits));
        }
    }
    best.map(|(id, _)| id)
}

fn visit_counts(tree: &MCTSTree) -> Vec<(Direction, u32)> {
    tree.root_node()
        .children
        .iter()
        .filter_map(|&child| {
            let node = tree.get(child);
            node.direction.map(|d| (d, node.visits))
        })
        .collect()
}

fn same_tiles(a: &Grid, b: &Grid) -> bool {
    a.dimensions() == b.dimensions() && a.cells() == b.cells()
}

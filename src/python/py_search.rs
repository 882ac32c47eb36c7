//! Search engine bindings for Python.

use pyo3::prelude::*;

use crate::expectimax::{ChanceModel, ExpectimaxConfig, ExpectimaxSearch};
use crate::mcts::{MCTSConfig, MCTSSearch};

use super::py_core::{PyDirection, PyGrid};

/// Python wrapper for ExpectimaxSearch.
#[pyclass(name = "Expectimax")]
pub struct PyExpectimax(ExpectimaxSearch);

#[pymethods]
impl PyExpectimax {
    /// Create an Expectimax engine with the default evaluation weights.
    ///
    /// # Arguments
    /// - depth: Search depth in plies (default: 4)
    /// - parallel: Search root directions on a thread pool (default: True)
    /// - twos_only: Chance nodes spawn only 2s (default: False)
    #[new]
    #[pyo3(signature = (depth = 4, parallel = true, twos_only = false))]
    fn new(depth: u32, parallel: bool, twos_only: bool) -> Self {
        let model = if twos_only { ChanceModel::TwosOnly } else { ChanceModel::Weighted };
        Self(ExpectimaxSearch::new(
            ExpectimaxConfig::default()
                .with_depth(depth)
                .with_parallel(parallel)
                .with_chance_model(model),
        ))
    }

    /// Choose a direction. Raises RuntimeError on a terminal grid.
    fn choose_move(&mut self, py: Python<'_>, grid: &PyGrid) -> PyResult<PyDirection> {
        let grid = grid.grid.clone();
        let direction = py.allow_threads(|| self.0.choose_move(&grid))?;
        Ok(PyDirection(direction))
    }

    /// Expected value per direction (UP, DOWN, LEFT, RIGHT); None if invalid.
    fn branch_values(&mut self, py: Python<'_>, grid: &PyGrid) -> Vec<Option<f64>> {
        let grid = grid.grid.clone();
        let branches = py.allow_threads(|| self.0.branch_evals(&grid));
        branches.iter().map(|b| b.valid.then_some(b.value)).collect()
    }

    /// Heuristic value of a grid.
    fn evaluate(&self, grid: &PyGrid) -> f64 {
        self.0.evaluation().evaluate(&grid.grid, None)
    }

    #[getter]
    fn depth(&self) -> u32 {
        self.0.config().depth
    }

    /// Nodes expanded by the last search.
    #[getter]
    fn nodes(&self) -> u64 {
        self.0.stats().nodes
    }

    fn __repr__(&self) -> String {
        format!("Expectimax(depth={})", self.0.config().depth)
    }
}

/// Python wrapper for MCTSSearch.
#[pyclass(name = "Mcts")]
pub struct PyMcts(MCTSSearch);

#[pymethods]
impl PyMcts {
    /// Create an MCTS engine with the default rollout evaluation.
    ///
    /// # Arguments
    /// - n_sim: Simulations per move (default: 300)
    /// - exploration_constant: UCT constant (default: 1.41)
    /// - max_depth: Depth cap relative to the root (default: 100)
    /// - seed: RNG seed for expansion and rollouts (default: 42)
    /// - reuse_tree: Keep the chosen subtree between moves (default: True)
    /// - time_limit_ms: Optional wall-clock cap per move
    #[new]
    #[pyo3(signature = (
        n_sim = 300,
        exploration_constant = 1.41,
        max_depth = 100,
        seed = 42,
        reuse_tree = true,
        time_limit_ms = None
    ))]
    fn new(
        n_sim: u32,
        exploration_constant: f64,
        max_depth: u32,
        seed: u64,
        reuse_tree: bool,
        time_limit_ms: Option<u64>,
    ) -> Self {
        let mut config = MCTSConfig::default()
            .with_simulations(n_sim)
            .with_exploration(exploration_constant)
            .with_max_depth(max_depth)
            .with_seed(seed)
            .with_tree_reuse(reuse_tree);
        config.time_limit_ms = time_limit_ms;
        Self(MCTSSearch::new(config))
    }

    /// Choose a direction. Raises RuntimeError on a terminal grid.
    fn choose_move(&mut self, py: Python<'_>, grid: &PyGrid) -> PyResult<PyDirection> {
        let grid = grid.grid.clone();
        let direction = py.allow_threads(|| self.0.choose_move(&grid))?;
        Ok(PyDirection(direction))
    }

    /// Root child visits from the last decision as (direction name, visits).
    fn visit_counts(&self) -> Vec<(String, u32)> {
        self.0
            .visit_counts()
            .iter()
            .map(|(d, v)| (d.to_string(), *v))
            .collect()
    }

    /// Simulations run by the last decision.
    #[getter]
    fn simulations(&self) -> u32 {
        self.0.stats().simulations
    }

    /// Drop the retained tree and reseed.
    fn reset(&mut self) {
        self.0.reset();
    }

    fn __repr__(&self) -> String {
        let config = self.0.config();
        format!("Mcts(n_sim={}, c={})", config.n_sim, config.exploration_constant)
    }
}

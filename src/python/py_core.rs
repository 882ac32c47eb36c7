//! Core type bindings for Python.

use numpy::{PyArray1, PyArray2, PyArrayMethods};
use pyo3::exceptions::{PyIndexError, PyValueError};
use pyo3::prelude::*;

use crate::core::{Direction, GameRng, Grid};

/// Python wrapper for Direction.
#[pyclass(name = "Direction")]
#[derive(Clone, Copy, Debug)]
pub struct PyDirection(pub Direction);

#[pymethods]
impl PyDirection {
    /// Parse a direction name ("up", "DOWN", ...).
    #[new]
    fn new(name: &str) -> PyResult<Self> {
        name.parse().map(Self).map_err(PyValueError::new_err)
    }

    /// All four directions in search order.
    #[staticmethod]
    fn all() -> Vec<Self> {
        Direction::ALL.into_iter().map(Self).collect()
    }

    /// Position in search order (UP=0 .. RIGHT=3).
    fn index(&self) -> usize {
        self.0.index()
    }

    #[getter]
    fn name(&self) -> String {
        self.0.to_string()
    }

    fn __repr__(&self) -> String {
        format!("Direction.{}", self.0)
    }

    fn __str__(&self) -> String {
        self.0.to_string()
    }

    fn __eq__(&self, other: &Self) -> bool {
        self.0 == other.0
    }

    fn __hash__(&self) -> u64 {
        self.0.index() as u64
    }
}

/// Python wrapper for Grid, with its own tile-spawn RNG.
#[pyclass(name = "Grid")]
#[derive(Clone)]
pub struct PyGrid {
    pub grid: Grid,
    rng: GameRng,
}

#[pymethods]
impl PyGrid {
    /// Create a grid with one random tile.
    ///
    /// # Arguments
    /// - width, height: Board dimensions (default 4x4)
    /// - seed: RNG seed for tile spawns
    #[new]
    #[pyo3(signature = (width = 4, height = 4, seed = 42))]
    fn new(width: usize, height: usize, seed: u64) -> PyResult<Self> {
        let mut rng = GameRng::new(seed);
        let grid = Grid::new(width, height, &mut rng)?;
        Ok(Self { grid, rng })
    }

    /// Build a grid from a list of rows. No tile is spawned.
    #[staticmethod]
    #[pyo3(signature = (rows, seed = 42))]
    fn from_rows(rows: Vec<Vec<u32>>, seed: u64) -> PyResult<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let grid = Grid::from_rows(width, height, &rows)?;
        Ok(Self {
            grid,
            rng: GameRng::new(seed),
        })
    }

    #[getter]
    fn width(&self) -> usize {
        self.grid.width()
    }

    #[getter]
    fn height(&self) -> usize {
        self.grid.height()
    }

    #[getter]
    fn score(&self) -> u64 {
        self.grid.score()
    }

    #[getter]
    fn move_count(&self) -> u32 {
        self.grid.move_count()
    }

    #[getter]
    fn last_move_score(&self) -> Option<u64> {
        self.grid.last_move_score()
    }

    #[getter]
    fn max_tile(&self) -> u32 {
        self.grid.max_tile()
    }

    /// Tile at (row, col); 0 means empty.
    fn value_at(&self, row: usize, col: usize) -> PyResult<u32> {
        self.grid
            .get(row, col)
            .ok_or_else(|| PyIndexError::new_err(format!("({}, {}) is outside the grid", row, col)))
    }

    fn is_terminal(&self) -> bool {
        self.grid.is_terminal()
    }

    /// Directions that would change the grid.
    fn valid_moves(&self) -> Vec<PyDirection> {
        self.grid.valid_moves().into_iter().map(PyDirection).collect()
    }

    /// Shift and merge without spawning a tile. Returns (valid, score_delta).
    fn apply(&mut self, direction: &PyDirection) -> (bool, u64) {
        let outcome = self.grid.apply(direction.0);
        (outcome.valid, outcome.score_delta)
    }

    /// Shift, merge and spawn a tile if the move was valid.
    /// Returns (valid, score_delta).
    fn play(&mut self, direction: &PyDirection) -> (bool, u64) {
        let outcome = self.grid.play(direction.0, &mut self.rng);
        (outcome.valid, outcome.score_delta)
    }

    /// Spawn a tile. Returns (row, col, value), or None on a full grid.
    fn insert_random_tile(&mut self) -> Option<(usize, usize, u32)> {
        self.grid.insert_random_tile(&mut self.rng)
    }

    fn to_list(&self) -> Vec<Vec<u32>> {
        self.grid.to_rows()
    }

    /// Tiles as a (height, width) uint32 array.
    fn to_numpy<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<u32>>> {
        PyArray1::from_slice_bound(py, self.grid.cells())
            .reshape([self.grid.height(), self.grid.width()])
            .map_err(|e| PyValueError::new_err(format!("{}", e)))
    }

    /// Copy of the tiles and score. With `fork=True` the copy spawns tiles
    /// from a forked generator instead of replaying this grid's stream.
    #[pyo3(signature = (fork=false))]
    fn copy(&mut self, fork: bool) -> Self {
        let rng = if fork { self.rng.fork() } else { self.rng.clone() };
        Self {
            grid: self.grid.clone(),
            rng,
        }
    }

    fn __str__(&self) -> String {
        self.grid.to_string()
    }

    fn __repr__(&self) -> String {
        format!(
            "Grid({}x{}, score={}, moves={})",
            self.grid.width(),
            self.grid.height(),
            self.grid.score(),
            self.grid.move_count()
        )
    }
}

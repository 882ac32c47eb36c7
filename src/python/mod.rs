//! Python bindings for the 2048 engines.
//!
//! # Quick Start
//!
//! ```python
//! import rust_2048 as g
//!
//! grid = g.Grid(4, 4, seed=7)
//! engine = g.Expectimax(depth=3)
//!
//! while not grid.is_terminal():
//!     grid.play(engine.choose_move(grid))
//!
//! print(grid.score, grid.max_tile)
//! print(grid.to_numpy())
//! ```

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::core::GameError;

mod py_core;
mod py_search;

pub use py_core::*;
pub use py_search::*;

impl From<GameError> for PyErr {
    fn from(err: GameError) -> Self {
        match err {
            GameError::NoValidMove => PyRuntimeError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// rust_2048: Expectimax and MCTS players for 2048.
#[pymodule]
fn rust_2048(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core types
    m.add_class::<PyDirection>()?;
    m.add_class::<PyGrid>()?;

    // Engines
    m.add_class::<PyExpectimax>()?;
    m.add_class::<PyMcts>()?;

    Ok(())
}

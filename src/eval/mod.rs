//! Heuristic evaluation of non-terminal grids.
//!
//! The evaluation function is a weighted sum of independent features. The
//! weight table is the primary tuning surface, so nothing is hardcoded:
//!
//! ```
//! use rust_2048::eval::{EvalConfig, EvaluationFunction, Feature};
//! use rust_2048::core::Grid;
//!
//! let eval = EvaluationFunction::new(
//!     EvalConfig::empty()
//!         .with_weight(Feature::Zeros, 2.0)
//!         .with_weight(Feature::Monotonicity, 0.5),
//! );
//! let grid = Grid::from_rows(4, 4, &[
//!     vec![2, 4, 8, 16],
//!     vec![0, 0, 0, 0],
//!     vec![0, 0, 0, 0],
//!     vec![0, 0, 0, 0],
//! ]).unwrap();
//! assert!(eval.evaluate(&grid, None) > 0.0);
//! ```

pub mod config;
pub mod features;
pub mod function;

pub use config::{EvalConfig, Feature};
pub use function::EvaluationFunction;

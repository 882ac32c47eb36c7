//! Crate-wide error type.

use thiserror::Error;

/// Errors returned by grid construction, search and configuration.
///
/// Playing an invalid move is not an error: it yields a `MoveOutcome`
/// with `valid == false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Grid data is {width}x{height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },

    #[error("Invalid grid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Invalid tile value {value} at ({row}, {col})")]
    InvalidTile { row: usize, col: usize, value: u32 },

    #[error("Cell ({row}, {col}) is outside the grid")]
    OutOfBounds { row: usize, col: usize },

    #[error("No valid move available")]
    NoValidMove,

    #[error("Config error: {0}")]
    Config(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GameError::DimensionMismatch {
            expected_width: 4,
            expected_height: 4,
            width: 3,
            height: 4,
        };
        assert_eq!(err.to_string(), "Grid data is 3x4, expected 4x4");
        assert_eq!(GameError::NoValidMove.to_string(), "No valid move available");
    }
}

//! Shift/merge engine.
//!
//! Each line (row for Left/Right, column for Up/Down) is read starting at
//! the edge tiles slide toward, compacted, merged in a single pass and
//! written back packed against that edge.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::direction::Direction;
use super::grid::{Grid, MAX_TILE};

/// Result of applying a direction to a grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// False iff the grid is unchanged.
    pub valid: bool,
    /// Sum of the tiles produced by merges.
    pub score_delta: u64,
}

impl MoveOutcome {
    /// Outcome of a move that changed nothing.
    pub const INVALID: MoveOutcome = MoveOutcome { valid: false, score_delta: 0 };
}

type Line = SmallVec<[u32; 8]>;

/// Stateless move application.
#[derive(Clone, Copy, Debug, Default)]
pub struct MoveEngine;

impl MoveEngine {
    /// Shift and merge every line of `grid` in `direction`, in place.
    ///
    /// Never spawns a tile. Updates the grid's score, move counter and
    /// last-move score.
    pub fn apply(grid: &mut Grid, direction: Direction) -> MoveOutcome {
        let (width, height) = grid.dimensions();
        let lines = if direction.is_horizontal() { height } else { width };
        let line_len = if direction.is_horizontal() { width } else { height };

        let mut valid = false;
        let mut score_delta = 0;
        let mut positions: SmallVec<[usize; 8]> = SmallVec::with_capacity(line_len);

        for line in 0..lines {
            positions.clear();
            positions.extend((0..line_len).map(|k| line_position(direction, width, height, line, k)));

            let cells = grid.cells_mut();
            let mut tiles: Line = positions.iter().map(|&p| cells[p]).filter(|&v| v != 0).collect();
            score_delta += merge_line(&mut tiles);

            for (k, &p) in positions.iter().enumerate() {
                let value = tiles.get(k).copied().unwrap_or(0);
                if cells[p] != value {
                    cells[p] = value;
                    valid = true;
                }
            }
        }

        let outcome = MoveOutcome { valid, score_delta };
        grid.record_move(outcome);
        outcome
    }

    /// Apply `direction` to a copy, leaving `grid` untouched.
    #[must_use]
    pub fn preview(grid: &Grid, direction: Direction) -> (Grid, MoveOutcome) {
        let mut next = grid.clone();
        let outcome = Self::apply(&mut next, direction);
        (next, outcome)
    }
}

/// Flat index of the `k`-th cell of `line`, counted from the target edge.
#[inline]
fn line_position(direction: Direction, width: usize, height: usize, line: usize, k: usize) -> usize {
    match direction {
        Direction::Left => line * width + k,
        Direction::Right => line * width + (width - 1 - k),
        Direction::Up => k * width + line,
        Direction::Down => (height - 1 - k) * width + line,
    }
}

/// Whether two neighbouring tiles combine. `MAX_TILE` pairs stay put.
#[inline]
pub(crate) fn can_merge(a: u32, b: u32) -> bool {
    a == b && a != MAX_TILE
}

/// Merge adjacent equal values of a compacted line in one pass.
///
/// A freshly doubled tile is stepped over, so no tile merges twice.
/// Returns the merge score.
pub fn merge_line(tiles: &mut SmallVec<[u32; 8]>) -> u64 {
    let mut score = 0;
    let mut i = 0;
    while i + 1 < tiles.len() {
        if can_merge(tiles[i], tiles[i + 1]) {
            tiles[i] *= 2;
            tiles.remove(i + 1);
            score += u64::from(tiles[i]);
        }
        i += 1;
    }
    score
}

//! Grid state: tile matrix, score, move counter, terminal detection.
//!
//! ## Invariants
//!
//! - Dimensions are fixed for the lifetime of a grid.
//! - Every non-zero cell holds a power of two ≥ 2.
//! - `width * height == cells.len()`, including grids read back with serde.
//! - `score` only grows, by exactly the merge score of each applied move.
//!
//! Searches clone grids freely; cells live inline for grids up to 4x4 so a
//! clone is a plain memcpy in the common case.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::direction::Direction;
use super::error::{GameError, Result};
use super::moves::{can_merge, MoveEngine, MoveOutcome};
use super::rng::RandomSource;

/// Probability that a spawned tile is a 2 (otherwise it is a 4).
pub const TWO_PROBABILITY: f64 = 0.9;

/// Largest tile a cell can hold. Two of them never merge.
pub const MAX_TILE: u32 = 1 << 31;

/// Inline cell storage; spills to the heap for grids larger than 4x4.
pub type Cells = SmallVec<[u32; 16]>;

/// A 2048 board.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GridRepr")]
pub struct Grid {
    width: usize,
    height: usize,
    /// Row-major tile values, 0 = empty.
    cells: Cells,
    score: u64,
    move_count: u32,
    last_move_score: Option<u64>,
}

/// Check that a value may appear in a cell.
#[inline]
#[must_use]
pub fn is_valid_tile(value: u32) -> bool {
    value == 0 || (value >= 2 && value.is_power_of_two())
}

/// Unchecked serde shape of a `Grid`; goes through `Grid::from_cells`.
#[derive(Deserialize)]
struct GridRepr {
    width: usize,
    height: usize,
    cells: Vec<u32>,
    score: u64,
    move_count: u32,
    last_move_score: Option<u64>,
}

impl TryFrom<GridRepr> for Grid {
    type Error = GameError;

    fn try_from(repr: GridRepr) -> Result<Self> {
        let mut grid = Self::from_cells(repr.width, repr.height, &repr.cells)?;
        grid.score = repr.score;
        grid.move_count = repr.move_count;
        grid.last_move_score = repr.last_move_score;
        Ok(grid)
    }
}

impl Grid {
    /// Create an empty grid with no tiles.
    pub fn empty(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GameError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: SmallVec::from_elem(0, width * height),
            score: 0,
            move_count: 0,
            last_move_score: None,
        })
    }

    /// Create a fresh game: an empty grid plus one random tile.
    pub fn new<R: RandomSource + ?Sized>(width: usize, height: usize, rng: &mut R) -> Result<Self> {
        let mut grid = Self::empty(width, height)?;
        grid.insert_random_tile(rng);
        Ok(grid)
    }

    /// Build a grid from explicit rows.
    ///
    /// Fails with `DimensionMismatch` if `rows` is not `height` rows of
    /// `width` values, and with `InvalidTile` for values that are not
    /// 0 or a power of two ≥ 2.
    pub fn from_rows(width: usize, height: usize, rows: &[Vec<u32>]) -> Result<Self> {
        let mut grid = Self::empty(width, height)?;
        grid.set_rows(rows)?;
        Ok(grid)
    }

    /// Build a grid from row-major cell values.
    pub fn from_cells(width: usize, height: usize, cells: &[u32]) -> Result<Self> {
        let mut grid = Self::empty(width, height)?;
        if cells.len() != width * height {
            return Err(GameError::DimensionMismatch {
                expected_width: width,
                expected_height: height,
                width: cells.len() / height,
                height,
            });
        }
        for (i, &value) in cells.iter().enumerate() {
            if !is_valid_tile(value) {
                return Err(GameError::InvalidTile { row: i / width, col: i % width, value });
            }
        }
        grid.cells = SmallVec::from_slice(cells);
        Ok(grid)
    }

    /// Replace all tile values, keeping score and counters.
    pub fn set_rows(&mut self, rows: &[Vec<u32>]) -> Result<()> {
        let mismatch = |width: usize| GameError::DimensionMismatch {
            expected_width: self.width,
            expected_height: self.height,
            width,
            height: rows.len(),
        };
        if rows.len() != self.height {
            return Err(mismatch(rows.first().map_or(0, Vec::len)));
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != self.width) {
            return Err(mismatch(bad.len()));
        }
        for (row, values) in rows.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if !is_valid_tile(value) {
                    return Err(GameError::InvalidTile { row, col, value });
                }
            }
        }
        self.cells = rows.iter().flatten().copied().collect();
        Ok(())
    }

    /// Clear the board and counters, then insert one random tile.
    pub fn reset<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        self.cells.iter_mut().for_each(|c| *c = 0);
        self.score = 0;
        self.move_count = 0;
        self.last_move_score = None;
        self.insert_random_tile(rng);
    }

    // === Accessors ===

    /// `(width, height)`.
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Tile value at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the grid.
    #[inline]
    #[must_use]
    pub fn value_at(&self, row: usize, col: usize) -> u32 {
        assert!(row < self.height && col < self.width, "cell ({row}, {col}) out of bounds");
        self.cells[row * self.width + col]
    }

    /// Tile value at `(row, col)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        (row < self.height && col < self.width).then(|| self.cells[row * self.width + col])
    }

    /// Place a tile (or clear a cell with 0).
    pub fn set_tile(&mut self, row: usize, col: usize, value: u32) -> Result<()> {
        if row >= self.height || col >= self.width {
            return Err(GameError::OutOfBounds { row, col });
        }
        if !is_valid_tile(value) {
            return Err(GameError::InvalidTile { row, col, value });
        }
        self.cells[row * self.width + col] = value;
        Ok(())
    }

    /// Row-major cell values.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [u32] {
        &mut self.cells
    }

    /// One row as a slice.
    #[must_use]
    pub fn row(&self, row: usize) -> &[u32] {
        &self.cells[row * self.width..(row + 1) * self.width]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        self.cells.chunks(self.width)
    }

    /// Iterate over the values of one column, top to bottom.
    pub fn column(&self, col: usize) -> impl Iterator<Item = u32> + '_ {
        self.cells.iter().skip(col).step_by(self.width).copied()
    }

    /// Copy out the rows as nested vectors.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.rows().map(<[u32]>::to_vec).collect()
    }

    /// Accumulated merge score.
    #[inline]
    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Number of valid moves applied.
    #[inline]
    #[must_use]
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Score delta of the most recent move attempt (`None` before any move).
    #[inline]
    #[must_use]
    pub fn last_move_score(&self) -> Option<u64> {
        self.last_move_score
    }

    /// Sum of all tile values.
    #[must_use]
    pub fn tile_sum(&self) -> u64 {
        self.cells.iter().map(|&v| u64::from(v)).sum()
    }

    /// Largest tile on the board (0 for an empty board).
    #[must_use]
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Coordinates of empty cells, row-major.
    #[must_use]
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == 0)
            .map(|(i, _)| (i / self.width, i % self.width))
            .collect()
    }

    /// Number of empty cells.
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    // === Game rules ===

    /// True when no cell is empty and no two orthogonal neighbours match.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        let w = self.width;
        for (i, &value) in self.cells.iter().enumerate() {
            if value == 0 {
                return false;
            }
            if i % w + 1 < w && can_merge(self.cells[i + 1], value) {
                return false;
            }
            if i + w < self.cells.len() && can_merge(self.cells[i + w], value) {
                return false;
            }
        }
        true
    }

    /// Spawn a 2 (90%) or 4 (10%) on a uniformly chosen empty cell.
    ///
    /// Returns the placed `(row, col, value)`, or `None` if the board is full.
    pub fn insert_random_tile<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Option<(usize, usize, u32)> {
        let empty = self.empty_cells();
        if empty.is_empty() {
            return None;
        }
        let (row, col) = empty[rng.index(empty.len())];
        let value = if rng.chance(TWO_PROBABILITY) { 2 } else { 4 };
        self.cells[row * self.width + col] = value;
        Some((row, col, value))
    }

    /// Shift and merge in `direction` without spawning a tile.
    pub fn apply(&mut self, direction: Direction) -> MoveOutcome {
        MoveEngine::apply(self, direction)
    }

    /// One full turn: shift/merge, then spawn a tile if the move was valid.
    ///
    /// A terminal grid is left untouched and reports an invalid move.
    pub fn play<R: RandomSource + ?Sized>(&mut self, direction: Direction, rng: &mut R) -> MoveOutcome {
        if self.is_terminal() {
            return MoveOutcome::INVALID;
        }
        let outcome = self.apply(direction);
        if outcome.valid {
            self.insert_random_tile(rng);
        }
        outcome
    }

    /// Directions that would change the board, in `Direction::ALL` order.
    #[must_use]
    pub fn valid_moves(&self) -> SmallVec<[Direction; 4]> {
        Direction::ALL
            .into_iter()
            .filter(|&dir| self.clone().apply(dir).valid)
            .collect()
    }

    pub(crate) fn record_move(&mut self, outcome: MoveOutcome) {
        self.score += outcome.score_delta;
        self.last_move_score = Some(outcome.score_delta);
        if outcome.valid {
            self.move_count += 1;
        }
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cell_width = self.max_tile().to_string().len();
        let rule = "-".repeat((cell_width + 1) * self.width + 1);
        writeln!(f, "{rule}")?;
        for row in self.rows() {
            write!(f, "|")?;
            for &value in row {
                if value == 0 {
                    write!(f, "{:^cell_width$}|", "")?;
                } else {
                    write!(f, "{value:^cell_width$}|")?;
                }
            }
            writeln!(f)?;
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::GameRng;

    fn grid(rows: &[[u32; 4]; 4]) -> Grid {
        let rows: Vec<Vec<u32>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_rows(4, 4, &rows).unwrap()
    }

    #[test]
    fn test_new_has_one_tile() {
        let mut rng = GameRng::new(42);
        let grid = Grid::new(4, 4, &mut rng).unwrap();

        assert_eq!(grid.empty_count(), 15);
        assert!(matches!(grid.max_tile(), 2 | 4));
        assert_eq!(grid.score(), 0);
        assert_eq!(grid.move_count(), 0);
        assert_eq!(grid.last_move_score(), None);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(
            Grid::empty(0, 4),
            Err(GameError::InvalidDimensions { width: 0, height: 4 })
        );
    }

    #[test]
    fn test_from_rows_dimension_mismatch() {
        let rows = vec![vec![0, 0, 0], vec![0, 0, 0], vec![0, 0, 0], vec![0, 0, 0]];
        let err = Grid::from_rows(4, 4, &rows).unwrap_err();
        assert_eq!(
            err,
            GameError::DimensionMismatch { expected_width: 4, expected_height: 4, width: 3, height: 4 }
        );

        let rows = vec![vec![0; 4]; 3];
        assert!(matches!(
            Grid::from_rows(4, 4, &rows),
            Err(GameError::DimensionMismatch { height: 3, .. })
        ));
    }

    #[test]
    fn test_from_rows_rejects_bad_tiles() {
        let mut rows = vec![vec![0; 4]; 4];
        rows[1][2] = 6;
        assert_eq!(
            Grid::from_rows(4, 4, &rows),
            Err(GameError::InvalidTile { row: 1, col: 2, value: 6 })
        );
        rows[1][2] = 1;
        assert!(Grid::from_rows(4, 4, &rows).is_err());
    }

    #[test]
    fn test_from_cells() {
        let grid = Grid::from_cells(2, 2, &[2, 0, 0, 4]).unwrap();
        assert_eq!(grid.value_at(0, 0), 2);
        assert_eq!(grid.value_at(1, 1), 4);
        assert!(Grid::from_cells(2, 2, &[2, 0, 0]).is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_counters() {
        let mut g = grid(&[[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 4]]);
        g.apply(Direction::Left);

        let json = serde_json::to_string(&g).unwrap();
        let back: Grid = serde_json::from_str(&json).unwrap();

        assert_eq!(back, g);
        assert_eq!((back.score(), back.move_count(), back.last_move_score()), (4, 1, Some(4)));
    }

    #[test]
    fn test_json_short_cells_rejected() {
        let json = r#"{"width":4,"height":4,"cells":[2,4],"score":0,"move_count":0,"last_move_score":null}"#;
        let err = serde_json::from_str::<Grid>(json).unwrap_err();
        assert!(err.to_string().contains("Grid data is 0x4, expected 4x4"), "{}", err);

        let repr = GridRepr {
            width: 4,
            height: 4,
            cells: vec![2, 4],
            score: 0,
            move_count: 0,
            last_move_score: None,
        };
        assert_eq!(
            Grid::try_from(repr),
            Err(GameError::DimensionMismatch { expected_width: 4, expected_height: 4, width: 0, height: 4 })
        );
    }

    #[test]
    fn test_json_bad_tile_rejected() {
        let json = r#"{"width":2,"height":1,"cells":[2,3],"score":0,"move_count":0,"last_move_score":null}"#;
        assert!(serde_json::from_str::<Grid>(json).is_err());

        let json = r#"{"width":0,"height":1,"cells":[],"score":0,"move_count":0,"last_move_score":null}"#;
        assert!(serde_json::from_str::<Grid>(json).is_err());
    }

    #[test]
    fn test_max_tiles_do_not_merge() {
        let mut top = Grid::from_cells(2, 1, &[MAX_TILE, MAX_TILE]).unwrap();

        assert!(top.is_terminal());
        assert!(top.valid_moves().is_empty());
        assert_eq!(top.apply(Direction::Left), MoveOutcome::INVALID);
        assert_eq!(top.cells(), &[MAX_TILE, MAX_TILE]);

        let mut below = Grid::from_cells(2, 1, &[MAX_TILE / 2, MAX_TILE / 2]).unwrap();
        assert!(!below.is_terminal());
        assert_eq!(below.apply(Direction::Left).score_delta, u64::from(MAX_TILE));
        assert_eq!(below.cells(), &[MAX_TILE, 0]);
    }

    #[test]
    fn test_set_tile_bounds() {
        let mut grid = Grid::empty(4, 4).unwrap();
        assert!(grid.set_tile(3, 3, 8).is_ok());
        assert_eq!(grid.get(3, 3), Some(8));
        assert_eq!(grid.set_tile(4, 0, 2), Err(GameError::OutOfBounds { row: 4, col: 0 }));
        assert_eq!(grid.get(4, 0), None);
    }

    #[test]
    fn test_terminal_alternating() {
        let full = grid(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(full.is_terminal());

        let with_pair = grid(&[[2, 2, 2, 4], [4, 8, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(!with_pair.is_terminal());

        let vertical_pair = grid(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 4]]);
        assert!(!vertical_pair.is_terminal());

        let with_hole = grid(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 0, 4], [4, 2, 4, 2]]);
        assert!(!with_hole.is_terminal());
    }

    #[test]
    fn test_terminal_does_not_wrap_rows() {
        // Last cell of row 0 equals first cell of row 1: not neighbours.
        let g = grid(&[[2, 4, 2, 4], [4, 2, 4, 2], [8, 16, 8, 16], [16, 8, 16, 8]]);
        assert!(g.is_terminal());
    }

    #[test]
    fn test_insert_random_tile_fills_empty_cell() {
        let mut rng = GameRng::new(1);
        let mut grid = Grid::empty(2, 2).unwrap();
        for placed in 1..=4 {
            let (row, col, value) = grid.insert_random_tile(&mut rng).unwrap();
            assert!(value == 2 || value == 4);
            assert_eq!(grid.value_at(row, col), value);
            assert_eq!(grid.empty_count(), 4 - placed);
        }
        assert_eq!(grid.insert_random_tile(&mut rng), None);
    }

    #[test]
    fn test_play_on_terminal_is_noop() {
        let mut rng = GameRng::new(5);
        let mut full = grid(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        let before = full.clone();

        let outcome = full.play(Direction::Left, &mut rng);
        assert!(!outcome.valid);
        assert_eq!(outcome.score_delta, 0);
        assert_eq!(full, before);
    }

    #[test]
    fn test_play_spawns_after_valid_move() {
        let mut rng = GameRng::new(9);
        let mut g = grid(&[[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);

        let outcome = g.play(Direction::Left, &mut rng);
        assert!(outcome.valid);
        assert_eq!(g.score(), 4);
        assert_eq!(g.move_count(), 1);
        assert_eq!(g.empty_count(), 14);

        // Invalid move: no spawn, counters untouched except last score
        let mut stuck = grid(&[[2, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let outcome = stuck.play(Direction::Left, &mut rng);
        assert!(!outcome.valid);
        assert_eq!(stuck.empty_count(), 15);
        assert_eq!(stuck.move_count(), 0);
        assert_eq!(stuck.last_move_score(), Some(0));
    }

    #[test]
    fn test_valid_moves() {
        let g = grid(&[[2, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        assert_eq!(g.valid_moves().as_slice(), &[Direction::Down, Direction::Right]);

        let full = grid(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(full.valid_moves().is_empty());
    }

    #[test]
    fn test_reset() {
        let mut rng = GameRng::new(11);
        let mut g = grid(&[[2, 2, 4, 8], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        g.apply(Direction::Left);
        g.reset(&mut rng);

        assert_eq!(g.score(), 0);
        assert_eq!(g.move_count(), 0);
        assert_eq!(g.empty_count(), 15);
    }

    #[test]
    fn test_columns_and_rows() {
        let g = grid(&[[2, 4, 8, 16], [0, 0, 0, 0], [0, 0, 0, 32], [0, 0, 0, 64]]);
        let col: Vec<u32> = g.column(3).collect();
        assert_eq!(col, vec![16, 0, 32, 64]);
        assert_eq!(g.row(0), &[2, 4, 8, 16]);
        assert_eq!(g.to_rows()[3], vec![0, 0, 0, 64]);
        assert_eq!(g.tile_sum(), 126);
        assert_eq!(g.max_tile(), 64);
    }

    #[test]
    fn test_display() {
        let g = Grid::from_cells(2, 1, &[2, 0]).unwrap();
        assert_eq!(g.to_string(), "-----\n|2| |\n-----\n");
    }
}

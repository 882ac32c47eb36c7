//! Board features.
//!
//! Every function is pure and total: a computation that would divide by
//! zero returns a fixed fallback (0 or the raw count) instead.

use smallvec::SmallVec;

use crate::core::grid::Grid;
use crate::core::moves::merge_line;

/// Default "high value" divider.
pub const DEFAULT_THRESHOLD: u32 = 256;

/// Horizontally and vertically adjacent cell pairs, rows first.
fn adjacent_pairs(grid: &Grid) -> impl Iterator<Item = (u32, u32)> + '_ {
    let (width, height) = grid.dimensions();
    let cells = grid.cells();
    let horizontal = (0..height).flat_map(move |r| (0..width.saturating_sub(1)).map(move |c| (r * width + c, r * width + c + 1)));
    let vertical = (0..height.saturating_sub(1)).flat_map(move |r| (0..width).map(move |c| (r * width + c, (r + 1) * width + c)));
    horizontal.chain(vertical).map(move |(a, b)| (cells[a], cells[b]))
}

/// All rows, then all columns, as owned lines.
fn lines(grid: &Grid) -> impl Iterator<Item = SmallVec<[u32; 8]>> + '_ {
    let rows = grid.rows().map(SmallVec::from_slice);
    let cols = (0..grid.width()).map(move |c| grid.column(c).collect());
    rows.chain(cols)
}

#[inline]
fn is_border(grid: &Grid, row: usize, col: usize) -> bool {
    row == 0 || col == 0 || row + 1 == grid.height() || col + 1 == grid.width()
}

/// Number of empty cells.
#[must_use]
pub fn zeros(grid: &Grid) -> f64 {
    grid.empty_count() as f64
}

/// Monotonicity: `cells² / Σ|log2(a) − log2(b)|` over adjacent non-zero pairs.
///
/// Grids with no exponent steps at all score 0.
#[must_use]
pub fn monotonicity(grid: &Grid) -> f64 {
    let sum: f64 = adjacent_pairs(grid)
        .filter(|&(a, b)| a != 0 && b != 0)
        .map(|(a, b)| (f64::from(a).log2() - f64::from(b).log2()).abs())
        .sum();
    if sum == 0.0 {
        0.0
    } else {
        (grid.size() * grid.size()) as f64 / sum
    }
}

/// Smoothness: tile sum divided by `Σ|a − b|` over adjacent non-zero pairs.
#[must_use]
pub fn smoothness(grid: &Grid) -> f64 {
    let diff: u64 = adjacent_pairs(grid)
        .filter(|&(a, b)| a != 0 && b != 0)
        .map(|(a, b)| u64::from(a.abs_diff(b)))
        .sum();
    if diff == 0 {
        0.0
    } else {
        grid.tile_sum() as f64 / diff as f64
    }
}

/// Sum of equal neighbouring values per row and per column, per cell.
///
/// Empty cells between two tiles are skipped, so `[2, 0, 2]` counts as a
/// pair. `values` restricts which tile values are considered.
#[must_use]
pub fn pairs(grid: &Grid, values: Option<&[u32]>) -> f64 {
    let keep = |v: u32| v != 0 && values.map_or(true, |set| set.contains(&v));
    let total: u64 = lines(grid)
        .map(|line| {
            let compact: SmallVec<[u32; 8]> = line.into_iter().filter(|&v| keep(v)).collect();
            compact
                .windows(2)
                .filter(|w| w[0] == w[1])
                .map(|w| u64::from(w[0]))
                .sum::<u64>()
        })
        .sum();
    total as f64 / grid.size() as f64
}

/// Sum of tiles ≥ `threshold` on the border, per cell.
#[must_use]
pub fn high_values_on_edge(grid: &Grid, threshold: u32) -> f64 {
    let width = grid.width();
    let total: u64 = grid
        .cells()
        .iter()
        .enumerate()
        .filter(|&(i, &v)| v != 0 && v >= threshold && is_border(grid, i / width, i % width))
        .map(|(_, &v)| u64::from(v))
        .sum();
    total as f64 / grid.size() as f64
}

/// Sum of tiles ≥ `threshold` in the four corners, per cell.
#[must_use]
pub fn high_values_in_corner(grid: &Grid, threshold: u32) -> f64 {
    let (w, h) = grid.dimensions();
    let mut corners: SmallVec<[usize; 4]> = SmallVec::from_slice(&[0, w - 1, (h - 1) * w, h * w - 1]);
    corners.sort_unstable();
    corners.dedup();
    let total: u64 = corners
        .iter()
        .map(|&i| grid.cells()[i])
        .filter(|&v| v != 0 && v >= threshold)
        .map(u64::from)
        .sum();
    total as f64 / grid.size() as f64
}

/// Sum of edge tiles larger than their inward neighbour, per cell.
///
/// A corner tile is checked against both inward neighbours.
#[must_use]
pub fn higher_on_edge(grid: &Grid) -> f64 {
    let (w, h) = grid.dimensions();
    let at = |r: usize, c: usize| grid.cells()[r * w + c];
    let mut total = 0u64;
    for r in 0..h {
        for c in 0..w {
            let v = at(r, c);
            if v == 0 {
                continue;
            }
            let checks = [
                r == 0 && h > 1 && v > at(1, c),
                r + 1 == h && h > 1 && v > at(h - 2, c),
                c == 0 && w > 1 && v > at(r, 1),
                c + 1 == w && w > 1 && v > at(r, w - 2),
            ];
            total += checks.iter().filter(|&&hit| hit).count() as u64 * u64::from(v);
        }
    }
    total as f64 / grid.size() as f64
}

/// `(high, low)` tile counts split at `threshold`.
fn split_counts(grid: &Grid, threshold: u32) -> (u32, u32) {
    grid.cells().iter().filter(|&&v| v != 0).fold((0, 0), |(high, low), &v| {
        if v >= threshold {
            (high + 1, low)
        } else {
            (high, low + 1)
        }
    })
}

/// High-to-low tile count ratio divided by the tile count.
///
/// With no low tiles the ratio falls back to the raw high count.
#[must_use]
pub fn high_to_low(grid: &Grid, threshold: u32) -> f64 {
    let (high, low) = split_counts(grid, threshold);
    ratio_over_total(high, low)
}

/// Low-to-high tile count ratio divided by the tile count.
///
/// With no high tiles the ratio falls back to the raw low count.
#[must_use]
pub fn low_to_high(grid: &Grid, threshold: u32) -> f64 {
    let (high, low) = split_counts(grid, threshold);
    ratio_over_total(low, high)
}

fn ratio_over_total(numerator: u32, denominator: u32) -> f64 {
    let total = numerator + denominator;
    if total == 0 {
        return 0.0;
    }
    let ratio = if denominator == 0 {
        f64::from(numerator)
    } else {
        f64::from(numerator) / f64::from(denominator)
    };
    ratio / f64::from(total)
}

/// Empty cells whose 2x2 block (as top-left corner) has at least two more
/// empty cells.
#[must_use]
pub fn zero_field(grid: &Grid) -> f64 {
    let (w, h) = grid.dimensions();
    let at = |r: usize, c: usize| grid.cells()[r * w + c];
    let mut field = 0;
    for r in 0..h.saturating_sub(1) {
        for c in 0..w.saturating_sub(1) {
            if at(r, c) != 0 {
                continue;
            }
            let others = [at(r + 1, c), at(r, c + 1), at(r + 1, c + 1)];
            if others.iter().filter(|&&v| v == 0).count() >= 2 {
                field += 1;
            }
        }
    }
    f64::from(field)
}

/// Score of the move that produced the grid.
#[must_use]
pub fn move_score(last_move_score: Option<u64>) -> f64 {
    last_move_score.unwrap_or(0) as f64
}

/// Running game score.
#[must_use]
pub fn cumulative_score(grid: &Grid) -> f64 {
    grid.score() as f64
}

/// Distance of each tile from its row maximum, per cell.
#[must_use]
pub fn flatness(grid: &Grid) -> f64 {
    let total: u64 = grid
        .rows()
        .map(|row| {
            let max = row.iter().copied().max().unwrap_or(0);
            row.iter().filter(|&&v| v != 0).map(|&v| u64::from(max - v)).sum::<u64>()
        })
        .sum();
    total as f64 / grid.size() as f64
}

/// Largest tile.
#[must_use]
pub fn max_tile(grid: &Grid) -> f64 {
    f64::from(grid.max_tile())
}

/// Sum of all tiles.
#[must_use]
pub fn tile_sum(grid: &Grid) -> f64 {
    grid.tile_sum() as f64
}

/// Mean over all cells, empty ones included.
#[must_use]
pub fn tile_mean(grid: &Grid) -> f64 {
    grid.tile_sum() as f64 / grid.size() as f64
}

/// Mean over occupied cells (0 for an empty grid).
#[must_use]
pub fn values_mean(grid: &Grid) -> f64 {
    let occupied = grid.size() - grid.empty_count();
    if occupied == 0 {
        0.0
    } else {
        grid.tile_sum() as f64 / occupied as f64
    }
}

/// Tiles equal to `value`.
#[must_use]
pub fn count_equal(grid: &Grid, value: u32) -> usize {
    grid.cells().iter().filter(|&&v| v != 0 && v == value).count()
}

/// Tiles `<= limit`.
#[must_use]
pub fn count_at_most(grid: &Grid, limit: u32) -> usize {
    grid.cells().iter().filter(|&&v| v != 0 && v <= limit).count()
}

/// Tiles `>= limit`.
#[must_use]
pub fn count_at_least(grid: &Grid, limit: u32) -> usize {
    grid.cells().iter().filter(|&&v| v != 0 && v >= limit).count()
}

/// Merge score obtainable along every row plus along every column.
#[must_use]
pub fn merge_potential(grid: &Grid) -> f64 {
    lines(grid)
        .map(|line| {
            let mut compact: SmallVec<[u32; 8]> = line.into_iter().filter(|&v| v != 0).collect();
            merge_line(&mut compact)
        })
        .sum::<u64>() as f64
}

/// Min-max scale `values` into `[0, 1]`; constant input maps to zeros.
#[must_use]
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|&x| if span > 0.0 { (x - min) / span } else { 0.0 })
        .collect()
}

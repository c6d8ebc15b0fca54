//! Reusable spaces and cell sets for engine tests.
//!
//! - [`line`] and [`grid`] build shared [`CellSpace`]s.
//! - [`cells`] turns literal ids into [`CellId`]s.
//! - [`block`] and [`scatter`] generate larger reachable sets.

use std::sync::Arc;

use reach_core::CellId;
use reach_space::{CellSpace, EdgeBehavior, Grid2D, Line1D};

/// `CellId`s from literal indices, in the given order.
pub fn cells(ids: &[u32]) -> Vec<CellId> {
    ids.iter().copied().map(CellId).collect()
}

/// An absorbing line of `len` cells.
///
/// # Panics
///
/// If `len` is zero.
pub fn line(len: u32) -> Arc<dyn CellSpace> {
    Arc::new(Line1D::new(len, EdgeBehavior::Absorb).expect("line fixture"))
}

/// An absorbing `cols` x `rows` grid.
///
/// # Panics
///
/// If either dimension is zero.
pub fn grid(cols: u32, rows: u32) -> Arc<Grid2D> {
    Arc::new(Grid2D::new(cols, rows, EdgeBehavior::Absorb).expect("grid fixture"))
}

/// The `w` x `h` rectangle of `grid` whose top-left corner is `(x, y)`,
/// clipped to the grid, in row-major order.
pub fn block(grid: &Grid2D, x: u32, y: u32, w: u32, h: u32) -> Vec<CellId> {
    let mut out = Vec::new();
    for row in y..y.saturating_add(h) {
        for col in x..x.saturating_add(w) {
            if let Some(c) = grid.cell_at(col, row) {
                out.push(c);
            }
        }
    }
    out
}

/// Up to `n` distinct cells below `cell_count`, chosen deterministically
/// from `seed`. Sorted.
pub fn scatter(seed: u64, n: usize, cell_count: u32) -> Vec<CellId> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut out: Vec<CellId> = (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            CellId(((state >> 33) % u64::from(cell_count.max(1))) as u32)
        })
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

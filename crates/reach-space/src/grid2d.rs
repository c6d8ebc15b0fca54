//! Row-major 2D grid.

use crate::axis::resolve_axis;
use crate::edge::EdgeBehavior;
use crate::error::SpaceError;
use crate::space::CellSpace;
use reach_core::{CellId, CellOffset};

/// A two-dimensional grid of `cols * rows` cells in row-major order.
///
/// Cell `(x, y)` has id `y * cols + x`, with `0 <= x < cols` and
/// `0 <= y < rows`. Offsets add `dx` to the column and `dy` to the row;
/// each axis is resolved independently under the grid's [`EdgeBehavior`].
///
/// # Examples
///
/// ```
/// use reach_core::{CellId, CellOffset};
/// use reach_space::{CellSpace, EdgeBehavior, Grid2D};
///
/// let grid = Grid2D::new(8, 4, EdgeBehavior::Absorb).unwrap();
/// assert_eq!(grid.cell_count(), 32);
///
/// let c = grid.cell_at(2, 1).unwrap();
/// assert_eq!(c, CellId(10));
/// assert_eq!(grid.offset_cell(c, CellOffset::new(1, 1)), grid.cell_at(3, 2));
/// assert_eq!(grid.offset_cell(c, CellOffset::new(0, -2)), None);
/// ```
#[derive(Debug, Clone)]
pub struct Grid2D {
    cols: u32,
    rows: u32,
    edge: EdgeBehavior,
}

impl Grid2D {
    /// Maximum dimension size: offset arithmetic uses `i32` deltas.
    pub const MAX_DIM: u32 = i32::MAX as u32;

    /// Create a grid with `cols * rows` cells and the given edge behavior.
    ///
    /// Returns `Err(SpaceError::EmptySpace)` if either dimension is 0,
    /// `Err(SpaceError::DimensionTooLarge)` if either exceeds `i32::MAX`,
    /// or `Err(SpaceError::CellCountOverflow)` if the total does not fit
    /// in a `u32` cell id.
    pub fn new(cols: u32, rows: u32, edge: EdgeBehavior) -> Result<Self, SpaceError> {
        if cols == 0 || rows == 0 {
            return Err(SpaceError::EmptySpace);
        }
        if cols > Self::MAX_DIM {
            return Err(SpaceError::DimensionTooLarge {
                name: "cols",
                value: cols,
                max: Self::MAX_DIM,
            });
        }
        if rows > Self::MAX_DIM {
            return Err(SpaceError::DimensionTooLarge {
                name: "rows",
                value: rows,
                max: Self::MAX_DIM,
            });
        }
        let cells = u64::from(cols) * u64::from(rows);
        if cells > u64::from(u32::MAX) {
            return Err(SpaceError::CellCountOverflow { cells });
        }
        Ok(Self { cols, rows, edge })
    }

    /// Number of columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Edge behavior.
    pub fn edge_behavior(&self) -> EdgeBehavior {
        self.edge
    }

    /// The cell at column `x`, row `y`, or `None` if out of bounds.
    pub fn cell_at(&self, x: u32, y: u32) -> Option<CellId> {
        if x >= self.cols || y >= self.rows {
            return None;
        }
        Some(CellId(y * self.cols + x))
    }

    /// The `(x, y)` position of `cell`, or `None` if out of range.
    pub fn xy(&self, cell: CellId) -> Option<(u32, u32)> {
        if cell.index() >= self.cell_count() {
            return None;
        }
        Some((cell.0 % self.cols, cell.0 / self.cols))
    }
}

impl CellSpace for Grid2D {
    fn cell_count(&self) -> usize {
        (self.cols as usize) * (self.rows as usize)
    }

    fn offset_cell(&self, cell: CellId, offset: CellOffset) -> Option<CellId> {
        let (x, y) = self.xy(cell)?;
        let nx = resolve_axis(i64::from(x) + i64::from(offset.dx), self.cols, self.edge)?;
        let ny = resolve_axis(i64::from(y) + i64::from(offset.dy), self.rows, self.edge)?;
        Some(CellId(ny * self.cols + nx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance;
    use proptest::prelude::*;

    fn arb_edge() -> impl Strategy<Value = EdgeBehavior> {
        prop_oneof![
            Just(EdgeBehavior::Absorb),
            Just(EdgeBehavior::Clamp),
            Just(EdgeBehavior::Wrap),
        ]
    }

    #[test]
    fn constructor_rejects_empty() {
        assert_eq!(
            Grid2D::new(0, 5, EdgeBehavior::Absorb).unwrap_err(),
            SpaceError::EmptySpace
        );
        assert_eq!(
            Grid2D::new(5, 0, EdgeBehavior::Absorb).unwrap_err(),
            SpaceError::EmptySpace
        );
    }

    #[test]
    fn constructor_rejects_oversized_dims() {
        let err = Grid2D::new(u32::MAX, 1, EdgeBehavior::Absorb).unwrap_err();
        assert!(matches!(err, SpaceError::DimensionTooLarge { name: "cols", .. }));
    }

    #[test]
    fn constructor_rejects_cell_id_overflow() {
        let err = Grid2D::new(70_000, 70_000, EdgeBehavior::Absorb).unwrap_err();
        assert_eq!(
            err,
            SpaceError::CellCountOverflow {
                cells: 70_000u64 * 70_000
            }
        );
    }

    #[test]
    fn cell_at_is_row_major() {
        let g = Grid2D::new(4, 3, EdgeBehavior::Absorb).unwrap();
        assert_eq!(g.cell_at(0, 0), Some(CellId(0)));
        assert_eq!(g.cell_at(3, 0), Some(CellId(3)));
        assert_eq!(g.cell_at(0, 1), Some(CellId(4)));
        assert_eq!(g.cell_at(3, 2), Some(CellId(11)));
        assert_eq!(g.cell_at(4, 0), None);
        assert_eq!(g.xy(CellId(6)), Some((2, 1)));
        assert_eq!(g.xy(CellId(12)), None);
    }

    #[test]
    fn absorb_corner_offsets() {
        let g = Grid2D::new(4, 4, EdgeBehavior::Absorb).unwrap();
        let corner = g.cell_at(0, 0).unwrap();
        assert_eq!(g.offset_cell(corner, CellOffset::new(-1, 0)), None);
        assert_eq!(g.offset_cell(corner, CellOffset::new(0, -1)), None);
        assert_eq!(g.offset_cell(corner, CellOffset::new(1, 1)), g.cell_at(1, 1));
    }

    #[test]
    fn wrap_is_a_torus() {
        let g = Grid2D::new(4, 4, EdgeBehavior::Wrap).unwrap();
        let corner = g.cell_at(0, 0).unwrap();
        assert_eq!(g.offset_cell(corner, CellOffset::new(-1, -1)), g.cell_at(3, 3));
    }

    #[test]
    fn clamp_pins_each_axis() {
        let g = Grid2D::new(4, 4, EdgeBehavior::Clamp).unwrap();
        let c = g.cell_at(3, 1).unwrap();
        assert_eq!(g.offset_cell(c, CellOffset::new(5, 1)), g.cell_at(3, 2));
    }

    #[test]
    fn downcast_through_trait_object() {
        let g: Box<dyn CellSpace> = Box::new(Grid2D::new(2, 2, EdgeBehavior::Absorb).unwrap());
        assert_eq!(g.downcast_ref::<Grid2D>().map(|g| g.cols()), Some(2));
        assert!(g.downcast_ref::<crate::Line1D>().is_none());
    }

    #[test]
    fn compliance_all_edges() {
        for edge in [EdgeBehavior::Absorb, EdgeBehavior::Clamp, EdgeBehavior::Wrap] {
            compliance::run_full_compliance(&Grid2D::new(5, 3, edge).unwrap());
        }
    }

    proptest! {
        #[test]
        fn offsets_stay_in_space(
            cols in 1u32..12,
            rows in 1u32..12,
            edge in arb_edge(),
            cell in 0u32..144,
            dx in -20i32..20,
            dy in -20i32..20,
        ) {
            let g = Grid2D::new(cols, rows, edge).unwrap();
            let cell = CellId(cell % (cols * rows));
            if let Some(n) = g.offset_cell(cell, CellOffset::new(dx, dy)) {
                prop_assert!(g.contains(n));
            } else {
                prop_assert_eq!(edge, EdgeBehavior::Absorb);
            }
        }

        #[test]
        fn offset_and_back_round_trips_inside(
            cols in 3u32..12,
            rows in 3u32..12,
            x in 1u32..2,
            y in 1u32..2,
            dx in -1i32..=1,
            dy in -1i32..=1,
        ) {
            let g = Grid2D::new(cols, rows, EdgeBehavior::Absorb).unwrap();
            let c = g.cell_at(x, y).unwrap();
            let there = g.offset_cell(c, CellOffset::new(dx, dy)).unwrap();
            prop_assert_eq!(g.offset_cell(there, CellOffset::new(-dx, -dy)), Some(c));
        }
    }
}

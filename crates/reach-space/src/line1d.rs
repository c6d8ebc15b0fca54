//! 1D line lattice with configurable edge behavior.

use crate::axis::resolve_axis;
use crate::edge::EdgeBehavior;
use crate::error::SpaceError;
use crate::space::CellSpace;
use reach_core::{CellId, CellOffset};

/// A one-dimensional line of cells `0..len`.
///
/// Only the `dx` component of an offset applies; any offset with a
/// non-zero `dy` is invalid on a line.
///
/// # Examples
///
/// ```
/// use reach_core::{CellId, CellOffset};
/// use reach_space::{CellSpace, EdgeBehavior, Line1D};
///
/// let line = Line1D::new(5, EdgeBehavior::Absorb).unwrap();
/// assert_eq!(line.cell_count(), 5);
/// assert_eq!(line.offset_cell(CellId(2), CellOffset::new(2, 0)), Some(CellId(4)));
/// assert_eq!(line.offset_cell(CellId(2), CellOffset::new(0, 1)), None);
/// ```
#[derive(Debug, Clone)]
pub struct Line1D {
    len: u32,
    edge: EdgeBehavior,
}

impl Line1D {
    /// Create a new line with `len` cells and the given edge behavior.
    ///
    /// Returns `Err(SpaceError::EmptySpace)` if `len == 0`.
    pub fn new(len: u32, edge: EdgeBehavior) -> Result<Self, SpaceError> {
        if len == 0 {
            return Err(SpaceError::EmptySpace);
        }
        Ok(Self { len, edge })
    }

    /// Number of cells.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Always returns `false`: construction rejects `len == 0`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Edge behavior.
    pub fn edge_behavior(&self) -> EdgeBehavior {
        self.edge
    }
}

impl CellSpace for Line1D {
    fn cell_count(&self) -> usize {
        self.len as usize
    }

    fn offset_cell(&self, cell: CellId, offset: CellOffset) -> Option<CellId> {
        if cell.0 >= self.len || offset.dy != 0 {
            return None;
        }
        let x = i64::from(cell.0) + i64::from(offset.dx);
        resolve_axis(x, self.len, self.edge).map(CellId)
    }
}

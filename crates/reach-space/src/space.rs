//! The core `CellSpace` trait and `dyn CellSpace` downcast support.

use reach_core::{CellId, CellOffset};
use std::any::Any;

/// The host grid, as far as the reachability engine is concerned.
///
/// A space exposes a fixed, dense range of cell ids (`0..cell_count`) and
/// resolves offsets between cells. Solidity, adjacency for path search,
/// and everything else about the grid stays on the host side.
///
/// # Thread Safety
///
/// `Sync` is required because queries with offsets run on arbitrary
/// reader threads through a shared `Arc<dyn CellSpace>`.
pub trait CellSpace: Any + Send + Sync + 'static {
    /// Total number of cells. Fixed for the lifetime of the space.
    fn cell_count(&self) -> usize;

    /// The cell at `offset` from `cell`, or `None` if that offset is not
    /// valid for `cell` (it leaves the space, or `cell` itself is out of
    /// range).
    fn offset_cell(&self, cell: CellId, offset: CellOffset) -> Option<CellId>;

    /// Whether `cell` names a cell of this space.
    fn contains(&self, cell: CellId) -> bool {
        cell.index() < self.cell_count()
    }
}

impl dyn CellSpace {
    /// Attempt to downcast a trait object to a concrete space type.
    pub fn downcast_ref<T: CellSpace>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}

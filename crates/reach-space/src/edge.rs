//! Edge behavior for offsets that leave the lattice.

/// How a lattice resolves an offset that steps past its edge.
///
/// # Examples
///
/// ```
/// use reach_core::{CellId, CellOffset};
/// use reach_space::{CellSpace, EdgeBehavior, Line1D};
///
/// let absorb = Line1D::new(4, EdgeBehavior::Absorb).unwrap();
/// assert_eq!(absorb.offset_cell(CellId(0), CellOffset::new(-1, 0)), None);
///
/// let wrap = Line1D::new(4, EdgeBehavior::Wrap).unwrap();
/// assert_eq!(wrap.offset_cell(CellId(0), CellOffset::new(-1, 0)), Some(CellId(3)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeBehavior {
    /// Out-of-bounds offsets resolve to the nearest boundary cell.
    Clamp,
    /// Out-of-bounds offsets wrap to the opposite side (periodic).
    Wrap,
    /// Out-of-bounds offsets are invalid.
    Absorb,
}

//! Standard offset tables.
//!
//! An offset table lists the cells from which an object can be used,
//! relative to the cell it sits in. A door is used from either side, a
//! workbench from the cell in front of it, a tall machine from any cell
//! it covers. Hosts pass these tables to offset-aware reachability
//! queries.

use reach_core::CellOffset;

/// Only the base cell.
pub const SELF_ONLY: &[CellOffset] = &[CellOffset::ORIGIN];

/// The base cell and its four orthogonal neighbours.
pub const ADJACENT4: &[CellOffset] = &[
    CellOffset::ORIGIN,
    CellOffset::new(-1, 0),
    CellOffset::new(1, 0),
    CellOffset::new(0, -1),
    CellOffset::new(0, 1),
];

/// The base cell and all eight surrounding cells.
pub const ADJACENT8: &[CellOffset] = &[
    CellOffset::ORIGIN,
    CellOffset::new(-1, 0),
    CellOffset::new(1, 0),
    CellOffset::new(0, -1),
    CellOffset::new(0, 1),
    CellOffset::new(-1, -1),
    CellOffset::new(1, -1),
    CellOffset::new(-1, 1),
    CellOffset::new(1, 1),
];

/// The base cell plus the cells directly above and below it.
pub const STANDING: &[CellOffset] = &[
    CellOffset::ORIGIN,
    CellOffset::new(0, 1),
    CellOffset::new(0, -1),
];

//! Error types for space construction.

use std::fmt;

/// Errors arising from space construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    /// Attempted to construct a space with zero cells.
    EmptySpace,
    /// A single dimension exceeds what offset arithmetic can represent.
    DimensionTooLarge {
        /// Which dimension (e.g. "cols", "rows", "len").
        name: &'static str,
        /// The value that was requested.
        value: u32,
        /// The maximum allowed value.
        max: u32,
    },
    /// The total number of cells does not fit in a [`CellId`](reach_core::CellId).
    CellCountOverflow {
        /// The requested number of cells.
        cells: u64,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySpace => write!(f, "space must have at least one cell"),
            Self::DimensionTooLarge { name, value, max } => {
                write!(f, "{name} = {value} exceeds maximum {max}")
            }
            Self::CellCountOverflow { cells } => {
                write!(f, "{cells} cells exceed the cell id range")
            }
        }
    }
}

impl std::error::Error for SpaceError {}

//! Error types for host calls into the reachability engine.
//!
//! Construction-time problems (bad capacity, bad offsets tables) live
//! with the crates that validate them. [`ReachError`] covers misuse at
//! runtime: the host named a prober or cell the engine cannot accept.

use std::error::Error;
use std::fmt;

use crate::id::CellId;

/// Errors returned by prober registration, occupancy, and pass control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReachError {
    /// The prober was never allocated, or has already been discarded.
    UnknownProber,
    /// The prober has been removed and is waiting for the worker to
    /// unwind its contribution. Its cells can no longer change.
    ProberRemoved,
    /// A cell id outside `0..cell_count` was supplied.
    CellOutOfRange {
        /// The offending cell.
        cell: CellId,
        /// Number of cells in the engine's space.
        cell_count: usize,
    },
    /// The engine has been shut down.
    ShuttingDown,
    /// A synchronous pass was requested from an engine whose worker runs
    /// on its own thread.
    NotManual,
}

impl fmt::Display for ReachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProber => write!(f, "prober is not registered"),
            Self::ProberRemoved => write!(f, "prober has been removed"),
            Self::CellOutOfRange { cell, cell_count } => {
                write!(f, "cell {cell} out of range for {cell_count} cells")
            }
            Self::ShuttingDown => write!(f, "engine is shutting down"),
            Self::NotManual => write!(f, "engine worker is not in manual mode"),
        }
    }
}

impl Error for ReachError {}

//! Host-facing traits: prober keys, change notification, and consumers.

use std::fmt::Debug;
use std::hash::Hash;

use crate::id::{CellId, CellOffset};

/// Identity of a prober as seen by the engine.
///
/// Any hashable, cloneable host value works: an entity handle, an index,
/// or a [`ProberId`](crate::ProberId). The engine never owns the prober;
/// it only keys its bookkeeping by this value.
pub trait ProberKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> ProberKey for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// Receives the cells whose reachability flipped since the previous drain.
///
/// Called from the foreground drain, at most once per tick, with the
/// whole batch. Never called with an empty slice.
pub trait ChangeNotifier: Send {
    /// The reachability of every cell in `cells` changed (reachable to
    /// unreachable, or the reverse) at least once since the last call.
    fn cells_changed(&mut self, cells: &[CellId]);
}

impl<F> ChangeNotifier for F
where
    F: FnMut(&[CellId]) + Send,
{
    fn cells_changed(&mut self, cells: &[CellId]) {
        self(cells)
    }
}

/// An object that wants to know whether it is reachable.
///
/// Consumers are queued with the engine and re-evaluated a bounded number
/// at a time on the foreground thread. Each evaluation tests the
/// consumer's cell and its offsets against the live cell index.
pub trait ReachabilityConsumer: Send + Sync {
    /// The cell the consumer currently occupies, or `None` if it is not
    /// placed in the world. Unplaced consumers are skipped.
    fn cell(&self) -> Option<CellId>;

    /// Offsets from which the consumer may be approached. An empty slice
    /// means only the base cell counts.
    fn offsets(&self) -> &[CellOffset];

    /// Deliver the result of a re-evaluation.
    fn set_reachable(&self, reachable: bool);
}

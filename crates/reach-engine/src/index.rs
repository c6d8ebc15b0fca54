//! Reference-counted cell index.
//!
//! [`CellIndex`] holds one signed counter per cell: the number of live
//! probers whose applied cell set contains that cell. A cell is reachable
//! exactly when its counter is positive. The background worker is the
//! only writer; any number of threads may read concurrently without
//! taking a lock.

use std::sync::atomic::{AtomicI32, Ordering};

use reach_core::CellId;

/// Per-cell reachability counters.
pub struct CellIndex {
    counts: Box<[AtomicI32]>,
}

// Compile-time assertion: CellIndex must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<CellIndex>();
};

impl CellIndex {
    /// Create an index with every counter at zero.
    pub fn new(cell_count: usize) -> Self {
        let counts = (0..cell_count).map(|_| AtomicI32::new(0)).collect();
        Self { counts }
    }

    /// Number of cells covered by the index.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the index covers no cells.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Current reference count of `cell`, or `None` if out of range.
    pub fn count(&self, cell: CellId) -> Option<i32> {
        self.counts
            .get(cell.index())
            .map(|slot| slot.load(Ordering::Acquire))
    }

    /// Whether at least one live prober reaches `cell`.
    ///
    /// Out-of-range cells are never reachable.
    #[inline]
    pub fn is_reachable(&self, cell: CellId) -> bool {
        self.counts
            .get(cell.index())
            .is_some_and(|slot| slot.load(Ordering::Acquire) > 0)
    }

    /// Add one reference to `cell`. Returns `true` if the cell just became
    /// reachable (the counter went from 0 to 1).
    pub(crate) fn increment(&self, cell: CellId) -> bool {
        let Some(slot) = self.counts.get(cell.index()) else {
            return false;
        };
        slot.fetch_add(1, Ordering::AcqRel) == 0
    }

    /// Drop one reference from `cell`. Returns `true` if the cell just
    /// became unreachable (the counter went from 1 to 0).
    ///
    /// A decrement of a zero counter is refused and reported; the counter
    /// is never stored below zero.
    pub(crate) fn decrement(&self, cell: CellId) -> bool {
        let Some(slot) = self.counts.get(cell.index()) else {
            return false;
        };
        match slot.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
            (n > 0).then(|| n - 1)
        }) {
            Ok(prev) => prev == 1,
            Err(_) => {
                log::warn!("reference count for cell {cell} would go negative; decrement ignored");
                false
            }
        }
    }

    /// Reset every counter to zero.
    pub(crate) fn clear(&self) {
        for slot in self.counts.iter() {
            slot.store(0, Ordering::Release);
        }
    }

    /// Number of cells with a positive counter. O(cells).
    pub fn reachable_count(&self) -> usize {
        self.counts
            .iter()
            .filter(|slot| slot.load(Ordering::Acquire) > 0)
            .count()
    }
}

impl std::fmt::Debug for CellIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellIndex")
            .field("cells", &self.len())
            .field("reachable", &self.reachable_count())
            .finish()
    }
}

//! Per-prober reachability records.
//!
//! A record holds what producers have submitted for one prober but the
//! worker has not yet applied. What *has* been applied lives in the
//! worker's own [`DiffPass`](crate::diff::DiffPass), out of reach of
//! producer threads.
//!
//! The lifecycle is an explicit state machine:
//!
//! ```text
//! Active { pending = false } --full query--> Active { pending = true }
//!          ^                                        |
//!          +-------------- worker applies ----------+
//! Active { .. } --remove--> PendingDestroy --worker unwinds--> Removed
//! ```
//!
//! Submitted cells exist only inside `Active`, so nothing can be merged
//! into a record once it has been removed.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexSet;
use parking_lot::Mutex;
use reach_core::{CellId, ReachError};

/// Counter for unique [`RecordId`] allocation.
static RECORD_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of one record instance.
///
/// A prober that is removed and allocated again gets a new record with a
/// new id, so the worker never confuses the two contributions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct RecordId(u64);

impl RecordId {
    fn next() -> Self {
        Self(RECORD_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Lifecycle state of a record, guarded by the record lock.
#[derive(Debug)]
pub(crate) enum RecordState {
    /// Accepting submissions.
    Active {
        /// Cells submitted since the worker last applied a full query.
        current: IndexSet<CellId>,
        /// A full query has been submitted and not yet applied.
        full_query_pending: bool,
    },
    /// Removed by the host; the worker still has to unwind it.
    PendingDestroy,
    /// Unwound and discarded.
    Removed,
}

/// Coarse lifecycle, without the submitted cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    /// Accepting submissions.
    Active,
    /// Waiting for the worker to unwind it.
    PendingDestroy,
    /// Unwound and discarded.
    Removed,
}

/// What happened when cells were merged into a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Merged {
    /// A full query was already pending when this submission arrived.
    pub overlapped: bool,
}

/// One prober's unapplied submissions and lifecycle.
#[derive(Debug)]
pub(crate) struct ProberRecord {
    id: RecordId,
    state: Mutex<RecordState>,
}

impl ProberRecord {
    pub fn new() -> Self {
        Self {
            id: RecordId::next(),
            state: Mutex::new(RecordState::Active {
                current: IndexSet::new(),
                full_query_pending: false,
            }),
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match &*self.state.lock() {
            RecordState::Active { .. } => Lifecycle::Active,
            RecordState::PendingDestroy => Lifecycle::PendingDestroy,
            RecordState::Removed => Lifecycle::Removed,
        }
    }

    /// Merge `cells` into the submitted set. Additive only.
    ///
    /// A full query additionally marks the record for the worker.
    pub fn occupy(&self, cells: &[CellId], full_query: bool) -> Result<Merged, ReachError> {
        let mut state = self.state.lock();
        match &mut *state {
            RecordState::Active {
                current,
                full_query_pending,
            } => {
                let overlapped = *full_query_pending;
                current.extend(cells.iter().copied());
                if full_query {
                    *full_query_pending = true;
                }
                Ok(Merged { overlapped })
            }
            RecordState::PendingDestroy | RecordState::Removed => Err(ReachError::ProberRemoved),
        }
    }

    /// Take the pending full query, if any.
    ///
    /// Clears the pending flag and the submitted set in the same critical
    /// section, so a racing submission lands wholly in this snapshot or
    /// wholly in the next one. The snapshot is sorted.
    pub fn take_full_query(&self) -> Option<Vec<CellId>> {
        let mut state = self.state.lock();
        let RecordState::Active {
            current,
            full_query_pending,
        } = &mut *state
        else {
            return None;
        };
        if !std::mem::replace(full_query_pending, false) {
            return None;
        }
        let mut snapshot: Vec<CellId> = std::mem::take(current).into_iter().collect();
        drop(state);
        snapshot.sort_unstable();
        Some(snapshot)
    }

    /// Move an active record to `PendingDestroy`. Returns `true` on the
    /// transition, `false` if it was already on its way out.
    pub fn mark_destroy(&self) -> bool {
        let mut state = self.state.lock();
        match *state {
            RecordState::Active { .. } => {
                *state = RecordState::PendingDestroy;
                true
            }
            RecordState::PendingDestroy | RecordState::Removed => false,
        }
    }

    /// Final transition, once the worker has unwound the record.
    pub fn mark_removed(&self) {
        *self.state.lock() = RecordState::Removed;
    }

    pub fn is_live(&self) -> bool {
        self.lifecycle() == Lifecycle::Active
    }
}

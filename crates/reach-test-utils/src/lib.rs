//! Test utilities and mock types for Reach development.
//!
//! Provides recording implementations of the host-facing traits
//! ([`ChangeNotifier`], [`ReachabilityConsumer`]) and the fixture
//! builders in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use reach_core::{CellId, CellOffset, ChangeNotifier, ReachabilityConsumer};
use smallvec::SmallVec;

/// A [`ChangeNotifier`] that records every batch it receives.
///
/// Clones share the same log, so keep one clone for assertions and hand
/// the other to the engine.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    batches: Arc<Mutex<Vec<Vec<CellId>>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every batch received so far, oldest first.
    pub fn batches(&self) -> Vec<Vec<CellId>> {
        self.batches.lock().clone()
    }

    /// Remove and return the recorded batches.
    pub fn take(&self) -> Vec<Vec<CellId>> {
        std::mem::take(&mut *self.batches.lock())
    }

    /// All recorded cells in delivery order, across batches.
    pub fn cells(&self) -> Vec<CellId> {
        self.batches.lock().iter().flatten().copied().collect()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().len()
    }
}

impl ChangeNotifier for RecordingNotifier {
    fn cells_changed(&mut self, cells: &[CellId]) {
        self.batches.lock().push(cells.to_vec());
    }
}

/// A [`ReachabilityConsumer`] that remembers its last result.
///
/// The cell can be moved (or cleared) between evaluations with
/// [`place`](MockConsumer::place).
pub struct MockConsumer {
    cell: Mutex<Option<CellId>>,
    offsets: SmallVec<[CellOffset; 8]>,
    reachable: Mutex<Option<bool>>,
    evaluations: AtomicUsize,
}

impl MockConsumer {
    /// A consumer at `cell` that only counts its own cell.
    pub fn at(cell: CellId) -> Arc<Self> {
        Self::with_offsets(Some(cell), &[])
    }

    /// A consumer not placed anywhere.
    pub fn unplaced() -> Arc<Self> {
        Self::with_offsets(None, &[])
    }

    pub fn with_offsets(cell: Option<CellId>, offsets: &[CellOffset]) -> Arc<Self> {
        Arc::new(Self {
            cell: Mutex::new(cell),
            offsets: offsets.iter().copied().collect(),
            reachable: Mutex::new(None),
            evaluations: AtomicUsize::new(0),
        })
    }

    pub fn place(&self, cell: Option<CellId>) {
        *self.cell.lock() = cell;
    }

    /// The last delivered result, or `None` if never evaluated.
    pub fn last_result(&self) -> Option<bool> {
        *self.reachable.lock()
    }

    /// How many results have been delivered.
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }
}

impl ReachabilityConsumer for MockConsumer {
    fn cell(&self) -> Option<CellId> {
        *self.cell.lock()
    }

    fn offsets(&self) -> &[CellOffset] {
        &self.offsets
    }

    fn set_reachable(&self, reachable: bool) {
        *self.reachable.lock() = Some(reachable);
        self.evaluations.fetch_add(1, Ordering::Relaxed);
    }
}

//! The diff pass: applies submitted full queries to the cell index.
//!
//! [`DiffPass`] owns every prober's *applied* cell set. Each pass walks
//! the registry and, for each record:
//!
//! 1. `PendingDestroy`: decrement every applied cell, then discard the
//!    record at the end of the pass.
//! 2. `Active` with a pending full query: diff the applied set against
//!    the submitted snapshot, increment what was added, decrement what
//!    was removed, and adopt the snapshot. Repeat while another full
//!    query arrived during the diff.
//!
//! Only counter transitions that flip a cell's reachability (0 to 1 or
//! 1 to 0) push the cell onto the dirty-cell queue, and each cell is
//! pushed at most once per pass.

use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Sender;
use indexmap::IndexMap;
use reach_core::{CellId, ProberKey};

use crate::index::CellIndex;
use crate::metrics::PassStats;
use crate::record::{Lifecycle, ProberRecord, RecordId};
use crate::registry::ProberRegistry;

/// One side of a sorted set difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Change {
    /// In the new set only.
    Added(CellId),
    /// In the old set only.
    Removed(CellId),
}

/// Walk two sorted, deduplicated cell lists and report their symmetric
/// difference in ascending cell order.
pub(crate) fn diff_sorted(old: &[CellId], new: &[CellId], mut f: impl FnMut(Change)) {
    let (mut i, mut j) = (0, 0);
    while i < old.len() && j < new.len() {
        match old[i].cmp(&new[j]) {
            std::cmp::Ordering::Less => {
                f(Change::Removed(old[i]));
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                f(Change::Added(new[j]));
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    for &c in &old[i..] {
        f(Change::Removed(c));
    }
    for &c in &new[j..] {
        f(Change::Added(c));
    }
}

/// Cells already pushed to the dirty queue during the current pass.
struct PassDirty {
    marks: Vec<bool>,
    cells: Vec<CellId>,
}

impl PassDirty {
    fn new(cell_count: usize) -> Self {
        Self {
            marks: vec![false; cell_count],
            cells: Vec::new(),
        }
    }

    /// Mark `cell`; returns `true` the first time it is marked this pass.
    fn mark(&mut self, cell: CellId) -> bool {
        match self.marks.get_mut(cell.index()) {
            Some(m) if !*m => {
                *m = true;
                self.cells.push(cell);
                true
            }
            _ => false,
        }
    }

    fn clear(&mut self) {
        for c in self.cells.drain(..) {
            self.marks[c.index()] = false;
        }
    }
}

/// Where a pass reads submissions from and writes results to.
pub(crate) struct PassTarget<'a, P> {
    pub registry: &'a ProberRegistry<P>,
    pub index: &'a CellIndex,
    pub dirty_tx: &'a Sender<CellId>,
}

/// Worker-owned state carried from one pass to the next.
pub(crate) struct DiffPass {
    /// Sorted applied cells per record. Absent means empty.
    applied: IndexMap<RecordId, Vec<CellId>>,
    dirty: PassDirty,
}

impl DiffPass {
    pub(crate) fn new(cell_count: usize) -> Self {
        Self {
            applied: IndexMap::new(),
            dirty: PassDirty::new(cell_count),
        }
    }

    /// Number of records with a non-empty applied set.
    #[cfg(test)]
    pub fn applied_records(&self) -> usize {
        self.applied.len()
    }

    /// Run one pass over every registered and retired record.
    pub(crate) fn run<P: ProberKey>(&mut self, target: &PassTarget<'_, P>) -> PassStats {
        let records = target.registry.snapshot();
        self.run_over(records, target)
    }

    /// Run one pass over `records`, taken from the registry beforehand.
    ///
    /// The registry may have moved on since: a prober allocated again in
    /// between has its old record on the retired list instead.
    fn run_over<P: ProberKey>(
        &mut self,
        records: Vec<(P, Arc<ProberRecord>)>,
        target: &PassTarget<'_, P>,
    ) -> PassStats {
        let start = Instant::now();
        let mut stats = PassStats::default();
        let mut doomed: Vec<(P, Arc<ProberRecord>)> = Vec::new();

        for (prober, record) in records {
            stats.records_visited += 1;
            match record.lifecycle() {
                Lifecycle::PendingDestroy => {
                    self.unwind(&record, target, &mut stats);
                    doomed.push((prober, record));
                }
                Lifecycle::Active => {
                    while let Some(snapshot) = record.take_full_query() {
                        self.apply(&record, snapshot, target, &mut stats);
                    }
                }
                Lifecycle::Removed => {}
            }
        }

        for record in target.registry.take_retired() {
            stats.records_visited += 1;
            self.unwind(&record, target, &mut stats);
            record.mark_removed();
            stats.records_removed += 1;
        }

        // A doomed record that lost its slot to a re-allocation is retired
        // and gets counted when the retired list is drained.
        for (prober, record) in doomed {
            if target.registry.discard(&prober, &record) {
                record.mark_removed();
                stats.records_removed += 1;
            }
        }

        self.dirty.clear();
        stats.elapsed_us = start.elapsed().as_micros() as u64;
        stats
    }

    /// Diff `snapshot` against the record's applied set and adopt it.
    fn apply<P>(
        &mut self,
        record: &ProberRecord,
        snapshot: Vec<CellId>,
        target: &PassTarget<'_, P>,
        stats: &mut PassStats,
    ) {
        let old = self.applied.swap_remove(&record.id()).unwrap_or_default();
        let dirty = &mut self.dirty;
        diff_sorted(&old, &snapshot, |change| match change {
            Change::Added(cell) => {
                stats.cells_incremented += 1;
                if target.index.increment(cell) {
                    enqueue(dirty, target.dirty_tx, cell, stats);
                }
            }
            Change::Removed(cell) => {
                stats.cells_decremented += 1;
                if target.index.decrement(cell) {
                    enqueue(dirty, target.dirty_tx, cell, stats);
                }
            }
        });
        if !snapshot.is_empty() {
            self.applied.insert(record.id(), snapshot);
        }
        stats.full_queries_applied += 1;
    }

    /// Remove the record's whole contribution from the index.
    fn unwind<P>(&mut self, record: &ProberRecord, target: &PassTarget<'_, P>, stats: &mut PassStats) {
        let Some(old) = self.applied.swap_remove(&record.id()) else {
            return;
        };
        for cell in old {
            stats.cells_decremented += 1;
            if target.index.decrement(cell) {
                enqueue(&mut self.dirty, target.dirty_tx, cell, stats);
            }
        }
    }

    /// Forget every applied set.
    pub(crate) fn clear(&mut self) {
        self.applied.clear();
        self.dirty.clear();
    }
}

fn enqueue(dirty: &mut PassDirty, tx: &Sender<CellId>, cell: CellId, stats: &mut PassStats) {
    if dirty.mark(cell) {
        // A closed queue means the engine is tearing down.
        let _ = tx.send(cell);
        stats.cells_enqueued += 1;
    }
}

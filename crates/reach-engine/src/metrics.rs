//! Pass statistics and cumulative engine metrics.
//!
//! [`PassStats`] describes a single worker pass. [`ReachMetrics`] is a
//! point-in-time copy of the engine's cumulative counters, suitable for
//! telemetry and tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// What one worker pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Records examined, including retired ones.
    pub records_visited: usize,
    /// Full queries diffed and applied to the index.
    pub full_queries_applied: usize,
    /// Counter increments performed.
    pub cells_incremented: usize,
    /// Counter decrements performed.
    pub cells_decremented: usize,
    /// Cells pushed onto the dirty-cell queue.
    pub cells_enqueued: usize,
    /// Records unwound and discarded.
    pub records_removed: usize,
    /// Wall-clock time for the pass, in microseconds.
    pub elapsed_us: u64,
}

impl PassStats {
    /// Whether the pass left the index untouched.
    pub fn is_noop(&self) -> bool {
        self.full_queries_applied == 0
            && self.cells_incremented == 0
            && self.cells_decremented == 0
            && self.records_removed == 0
    }
}

/// Cumulative engine counters at a point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReachMetrics {
    /// Worker passes completed.
    pub passes: u64,
    /// Full queries applied across all passes.
    pub full_queries_applied: u64,
    /// Counter increments across all passes.
    pub cells_incremented: u64,
    /// Counter decrements across all passes.
    pub cells_decremented: u64,
    /// Cells pushed onto the dirty-cell queue.
    pub cells_enqueued: u64,
    /// Records unwound and discarded.
    pub records_removed: u64,
    /// Submissions that arrived while a full query was already pending.
    pub overlapping_full_queries: u64,
    /// Duration of the most recent pass, in microseconds.
    pub last_pass_us: u64,
    /// Cells handed to the change notifier by the foreground drain.
    pub cells_notified: u64,
    /// Consumers re-evaluated by the foreground drain.
    pub consumers_evaluated: u64,
}

/// Shared atomic counters behind [`ReachMetrics`].
#[derive(Debug, Default)]
pub(crate) struct Counters {
    passes: AtomicU64,
    full_queries_applied: AtomicU64,
    cells_incremented: AtomicU64,
    cells_decremented: AtomicU64,
    cells_enqueued: AtomicU64,
    records_removed: AtomicU64,
    overlapping_full_queries: AtomicU64,
    last_pass_us: AtomicU64,
    cells_notified: AtomicU64,
    consumers_evaluated: AtomicU64,
}

impl Counters {
    pub fn record_pass(&self, stats: &PassStats) {
        self.passes.fetch_add(1, Ordering::Relaxed);
        self.full_queries_applied
            .fetch_add(stats.full_queries_applied as u64, Ordering::Relaxed);
        self.cells_incremented
            .fetch_add(stats.cells_incremented as u64, Ordering::Relaxed);
        self.cells_decremented
            .fetch_add(stats.cells_decremented as u64, Ordering::Relaxed);
        self.cells_enqueued
            .fetch_add(stats.cells_enqueued as u64, Ordering::Relaxed);
        self.records_removed
            .fetch_add(stats.records_removed as u64, Ordering::Relaxed);
        self.last_pass_us.store(stats.elapsed_us, Ordering::Relaxed);
    }

    pub fn record_overlap(&self) {
        self.overlapping_full_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_drain(&self, cells_notified: usize, consumers_evaluated: usize) {
        self.cells_notified
            .fetch_add(cells_notified as u64, Ordering::Relaxed);
        self.consumers_evaluated
            .fetch_add(consumers_evaluated as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ReachMetrics {
        ReachMetrics {
            passes: self.passes.load(Ordering::Relaxed),
            full_queries_applied: self.full_queries_applied.load(Ordering::Relaxed),
            cells_incremented: self.cells_incremented.load(Ordering::Relaxed),
            cells_decremented: self.cells_decremented.load(Ordering::Relaxed),
            cells_enqueued: self.cells_enqueued.load(Ordering::Relaxed),
            records_removed: self.records_removed.load(Ordering::Relaxed),
            overlapping_full_queries: self.overlapping_full_queries.load(Ordering::Relaxed),
            last_pass_us: self.last_pass_us.load(Ordering::Relaxed),
            cells_notified: self.cells_notified.load(Ordering::Relaxed),
            consumers_evaluated: self.consumers_evaluated.load(Ordering::Relaxed),
        }
    }
}

//! The foreground drain: the once-per-tick hand-off from the worker to
//! the host.
//!
//! Owned by the engine and only touched through `&mut`, so it never
//! needs a lock. Nothing in here blocks: the dirty-cell queue is read
//! with `try_iter` and consumer re-evaluation is capped per tick by
//! [`DrainConfig::budget`].

use std::collections::VecDeque;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use log::debug;
use reach_core::{CellId, CellOffset, ChangeNotifier, ReachabilityConsumer};

use crate::config::DrainConfig;

/// What one [`update()`](crate::ReachabilityEngine::update) did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Distinct cells handed to the change notifier.
    pub cells_notified: usize,
    /// Consumers re-evaluated this tick (including unplaced ones skipped).
    pub consumers_evaluated: usize,
    /// Consumers still queued afterwards.
    pub consumers_pending: usize,
}

pub(crate) struct ForegroundDrain {
    dirty_rx: Receiver<CellId>,
    scratch: Vec<CellId>,
    pending: VecDeque<Arc<dyn ReachabilityConsumer>>,
    notifier: Box<dyn ChangeNotifier>,
    config: DrainConfig,
}

impl ForegroundDrain {
    pub fn new(
        dirty_rx: Receiver<CellId>,
        notifier: Box<dyn ChangeNotifier>,
        config: DrainConfig,
    ) -> Self {
        Self {
            dirty_rx,
            scratch: Vec::new(),
            pending: VecDeque::new(),
            notifier,
            config,
        }
    }

    pub fn enqueue(&mut self, consumer: Arc<dyn ReachabilityConsumer>) {
        self.pending.push_back(consumer);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Flush dirty cells to the notifier, then evaluate a bounded slice of
    /// queued consumers with `reachable`.
    pub fn update(&mut self, reachable: impl Fn(CellId, &[CellOffset]) -> bool) -> DrainReport {
        let cells_notified = self.flush_dirty();

        let budget = self.config.budget(self.pending.len());
        for _ in 0..budget {
            let Some(consumer) = self.pending.pop_front() else {
                break;
            };
            match consumer.cell() {
                Some(cell) => consumer.set_reachable(reachable(cell, consumer.offsets())),
                None => debug!("skipping reachability consumer with no cell"),
            }
        }

        DrainReport {
            cells_notified,
            consumers_evaluated: budget,
            consumers_pending: self.pending.len(),
        }
    }

    /// Hand every queued dirty cell to the notifier in one batch.
    ///
    /// A cell that flipped in several passes since the last tick is
    /// reported once.
    fn flush_dirty(&mut self) -> usize {
        self.scratch.extend(self.dirty_rx.try_iter());
        if self.scratch.is_empty() {
            return 0;
        }
        self.scratch.sort_unstable();
        self.scratch.dedup();
        self.notifier.cells_changed(&self.scratch);
        let n = self.scratch.len();
        self.scratch.clear();
        n
    }

    /// Discard queued cells and consumers without notifying anyone.
    pub fn clear(&mut self) {
        for _ in self.dirty_rx.try_iter() {}
        self.scratch.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Probe {
        cell: Option<CellId>,
        result: Mutex<Option<bool>>,
    }

    impl Probe {
        fn at(cell: Option<u32>) -> Arc<Self> {
            Arc::new(Self {
                cell: cell.map(CellId),
                result: Mutex::new(None),
            })
        }
    }

    impl ReachabilityConsumer for Probe {
        fn cell(&self) -> Option<CellId> {
            self.cell
        }
        fn offsets(&self) -> &[CellOffset] {
            &[]
        }
        fn set_reachable(&self, reachable: bool) {
            *self.result.lock() = Some(reachable);
        }
    }

    fn drain_with_log() -> (
        ForegroundDrain,
        crossbeam_channel::Sender<CellId>,
        Arc<Mutex<Vec<Vec<CellId>>>>,
    ) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let notifier = move |cells: &[CellId]| sink.lock().push(cells.to_vec());
        (
            ForegroundDrain::new(rx, Box::new(notifier), DrainConfig::default()),
            tx,
            log,
        )
    }

    #[test]
    fn dirty_cells_are_batched_and_deduplicated() {
        let (mut drain, tx, log) = drain_with_log();
        for c in [4, 1, 4, 2] {
            tx.send(CellId(c)).unwrap();
        }
        let report = drain.update(|_, _| false);
        assert_eq!(report.cells_notified, 3);
        assert_eq!(*log.lock(), vec![vec![CellId(1), CellId(2), CellId(4)]]);
    }

    #[test]
    fn empty_queue_does_not_notify() {
        let (mut drain, _tx, log) = drain_with_log();
        let report = drain.update(|_, _| false);
        assert_eq!(report, DrainReport::default());
        assert!(log.lock().is_empty());
    }

    #[test]
    fn consumers_drain_in_bounded_slices() {
        let (mut drain, _tx, _log) = drain_with_log();
        let probes: Vec<_> = (0..40).map(|i| Probe::at(Some(i))).collect();
        for p in &probes {
            drain.enqueue(Arc::clone(p) as Arc<dyn ReachabilityConsumer>);
        }

        let report = drain.update(|cell, _| cell.0 % 2 == 0);
        assert_eq!(report.consumers_evaluated, 10);
        assert_eq!(report.consumers_pending, 30);
        assert_eq!(*probes[0].result.lock(), Some(true));
        assert_eq!(*probes[9].result.lock(), Some(false));
        assert_eq!(*probes[10].result.lock(), None);

        let mut ticks = 1;
        while drain.pending() > 0 {
            drain.update(|_, _| true);
            ticks += 1;
        }
        assert!(ticks <= 5, "backlog took {ticks} ticks");
        assert!(probes.iter().all(|p| p.result.lock().is_some()));
    }

    #[test]
    fn unplaced_consumers_are_skipped() {
        let (mut drain, _tx, _log) = drain_with_log();
        let p = Probe::at(None);
        drain.enqueue(Arc::clone(&p) as Arc<dyn ReachabilityConsumer>);
        let report = drain.update(|_, _| true);
        assert_eq!(report.consumers_evaluated, 1);
        assert_eq!(*p.result.lock(), None);
    }

    #[test]
    fn clear_discards_everything() {
        let (mut drain, tx, log) = drain_with_log();
        tx.send(CellId(0)).unwrap();
        drain.enqueue(Probe::at(Some(0)));
        drain.clear();
        assert_eq!(drain.pending(), 0);
        assert_eq!(drain.update(|_, _| true).cells_notified, 0);
        assert!(log.lock().is_empty());
    }
}

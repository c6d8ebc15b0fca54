//! The owning engine, its shared state, and the cloneable producer handle.
//!
//! Ownership is split three ways:
//!
//! - [`Shared`] holds everything producers, readers and the worker touch
//!   concurrently: the cell index, the registry, the trigger, and the
//!   sending half of the dirty-cell queue.
//! - [`ReachHandle`] is a cheap `Arc<Shared>` wrapper any thread can hold.
//! - [`ReachabilityEngine`] owns the foreground drain and the worker (or,
//!   in manual mode, the diff state itself) and runs the shutdown state
//!   machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::Sender;
use log::{debug, info, warn};
use reach_core::{CellId, CellOffset, ChangeNotifier, ProberKey, ReachError, ReachabilityConsumer};
use reach_space::CellSpace;

use crate::config::{ConfigError, EngineConfig, WorkerMode};
use crate::diff::{DiffPass, PassTarget};
use crate::drain::{DrainReport, ForegroundDrain};
use crate::index::CellIndex;
use crate::metrics::{Counters, PassStats, ReachMetrics};
use crate::registry::ProberRegistry;
use crate::trigger::Trigger;
use crate::worker::WorkerLoop;

// ── Shared ───────────────────────────────────────────────────────

pub(crate) struct Shared<P> {
    space: Arc<dyn CellSpace>,
    index: CellIndex,
    registry: ProberRegistry<P>,
    trigger: Trigger,
    dirty_tx: Sender<CellId>,
    destroyed: AtomicBool,
    counters: Counters,
}

impl<P: ProberKey> Shared<P> {
    pub fn cell_count(&self) -> usize {
        self.index.len()
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    fn check_running(&self) -> Result<(), ReachError> {
        if self.is_destroyed() {
            Err(ReachError::ShuttingDown)
        } else {
            Ok(())
        }
    }

    /// Run one diff pass over `pass` and fold its stats into the counters.
    pub fn run_pass(&self, pass: &mut DiffPass) -> PassStats {
        let target = PassTarget {
            registry: &self.registry,
            index: &self.index,
            dirty_tx: &self.dirty_tx,
        };
        let stats = pass.run(&target);
        self.counters.record_pass(&stats);
        if !stats.is_noop() {
            debug!(
                "reachability pass: {} full queries, +{} -{} cells, {} enqueued, {} removed in {}us",
                stats.full_queries_applied,
                stats.cells_incremented,
                stats.cells_decremented,
                stats.cells_enqueued,
                stats.records_removed,
                stats.elapsed_us
            );
        }
        stats
    }

    fn reachable_with_offsets(&self, cell: CellId, offsets: &[CellOffset]) -> bool {
        if !self.space.contains(cell) {
            return false;
        }
        self.index.is_reachable(cell)
            || offsets.iter().any(|&off| {
                self.space
                    .offset_cell(cell, off)
                    .is_some_and(|c| self.index.is_reachable(c))
            })
    }
}

// ── ReachHandle ──────────────────────────────────────────────────

/// Cloneable, thread-safe access to a running engine.
///
/// Producers on any thread use a handle to register probers and submit
/// reachable-cell sets; readers use it for lock-free queries. Handles do
/// not keep the worker alive: once the owning [`ReachabilityEngine`] shuts
/// down, producer calls fail with [`ReachError::ShuttingDown`] and every
/// cell reads as unreachable.
pub struct ReachHandle<P> {
    shared: Arc<Shared<P>>,
}

impl<P> Clone for ReachHandle<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

// Compile-time assertion: handles can be shared across producer threads.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<ReachHandle<u64>>();
};

impl<P: ProberKey> ReachHandle<P> {
    /// Register `prober`. Idempotent: returns `Ok(false)` if it is already
    /// registered and live.
    ///
    /// A prober that was removed but not yet unwound by the worker is
    /// registered afresh; its old contribution is still unwound.
    pub fn allocate(&self, prober: P) -> Result<bool, ReachError> {
        self.shared.check_running()?;
        Ok(self.shared.registry.allocate(prober))
    }

    /// Merge `cells` into `prober`'s submitted set.
    ///
    /// Additive only. With `full_query`, the accumulated set becomes the
    /// prober's authoritative reachable set at the next pass, and the
    /// worker is woken. Submitting while a full query is still pending is
    /// logged and merged (the union wins).
    ///
    /// Every cell is range-checked before anything is merged.
    pub fn occupy(&self, prober: &P, cells: &[CellId], full_query: bool) -> Result<(), ReachError> {
        self.shared.check_running()?;
        let cell_count = self.shared.cell_count();
        if let Some(&cell) = cells.iter().find(|c| c.index() >= cell_count) {
            return Err(ReachError::CellOutOfRange { cell, cell_count });
        }
        let record = self
            .shared
            .registry
            .get(prober)
            .ok_or(ReachError::UnknownProber)?;
        let merged = record.occupy(cells, full_query)?;
        if merged.overlapped {
            warn!("prober {prober:?} submitted while a full query was pending; keeping the union");
            self.shared.counters.record_overlap();
        }
        if full_query {
            self.shared.trigger.signal();
        }
        Ok(())
    }

    /// Mark `prober` for removal. Its contribution is unwound by the next
    /// pass. Removing a prober that is already on its way out is a no-op.
    pub fn remove(&self, prober: &P) -> Result<(), ReachError> {
        self.shared.check_running()?;
        let record = self
            .shared
            .registry
            .get(prober)
            .ok_or(ReachError::UnknownProber)?;
        if record.mark_destroy() {
            self.shared.trigger.signal();
        }
        Ok(())
    }

    /// Whether at least one live prober reaches `cell`. Lock-free.
    /// Out-of-range cells are unreachable.
    pub fn is_reachable(&self, cell: CellId) -> bool {
        self.shared.index.is_reachable(cell)
    }

    /// Whether `cell`, or any cell one of `offsets` resolves to from it,
    /// is reachable.
    pub fn is_reachable_with_offsets(&self, cell: CellId, offsets: &[CellOffset]) -> bool {
        self.shared.reachable_with_offsets(cell, offsets)
    }

    /// Number of live probers whose applied set contains `cell`, or `None`
    /// if out of range.
    pub fn reference_count(&self, cell: CellId) -> Option<i32> {
        self.shared.index.count(cell)
    }

    /// Whether `prober` is registered and not removed.
    pub fn is_registered(&self, prober: &P) -> bool {
        self.shared.registry.contains_live(prober)
    }

    /// Number of live probers.
    pub fn prober_count(&self) -> usize {
        self.shared.registry.live_len()
    }

    /// Size of the cell-id space.
    pub fn cell_count(&self) -> usize {
        self.shared.cell_count()
    }

    /// Cells currently reachable.
    pub fn reachable_count(&self) -> usize {
        self.shared.index.reachable_count()
    }

    /// Snapshot of the engine's cumulative counters.
    pub fn metrics(&self) -> ReachMetrics {
        self.shared.counters.snapshot()
    }
}

// ── ShutdownReport ───────────────────────────────────────────────

/// Report from [`ReachabilityEngine::shutdown`].
#[derive(Debug)]
pub struct ShutdownReport {
    /// Total time spent in the shutdown sequence.
    pub total_ms: u64,
    /// Whether the worker thread exited cleanly (always `true` in manual
    /// mode or on a repeated shutdown).
    pub worker_joined: bool,
    /// Prober records discarded, including ones awaiting removal.
    pub records_cleared: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownState {
    Running,
    Stopping,
    Stopped,
}

enum Driver {
    Threaded(Option<JoinHandle<DiffPass>>),
    Manual(DiffPass),
}

// ── ReachabilityEngine ───────────────────────────────────────────

/// The reachability engine.
///
/// Owns the foreground side: the change notifier, the consumer queue and
/// the worker. Drive it by calling [`update()`](Self::update) exactly once
/// per host tick from the thread that owns the host's tick; hand
/// [`handle()`](Self::handle) clones to every other thread.
///
/// Dropping the engine shuts it down.
pub struct ReachabilityEngine<P: ProberKey> {
    handle: ReachHandle<P>,
    drain: ForegroundDrain,
    driver: Driver,
    state: ShutdownState,
}

impl<P: ProberKey> ReachabilityEngine<P> {
    /// Validate `config` and start the engine.
    ///
    /// In [`WorkerMode::Threaded`] this spawns the worker thread.
    pub fn new(
        config: EngineConfig,
        notifier: impl ChangeNotifier + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let EngineConfig {
            space,
            worker,
            drain,
        } = config;
        let cell_count = space.cell_count();
        let (dirty_tx, dirty_rx) = crossbeam_channel::unbounded();

        let shared = Arc::new(Shared {
            space,
            index: CellIndex::new(cell_count),
            registry: ProberRegistry::new(),
            trigger: Trigger::new(),
            dirty_tx,
            destroyed: AtomicBool::new(false),
            counters: Counters::default(),
        });
        let pass = DiffPass::new(cell_count);

        let driver = match worker.mode {
            WorkerMode::Threaded => {
                let worker_shared = Arc::clone(&shared);
                let timeout = worker.wait_timeout();
                let join = thread::Builder::new()
                    .name(worker.thread_name.clone())
                    .spawn(move || WorkerLoop::new(worker_shared, pass, timeout).run())
                    .map_err(|e| ConfigError::ThreadSpawnFailed {
                        reason: format!("{}: {e}", worker.thread_name),
                    })?;
                Driver::Threaded(Some(join))
            }
            WorkerMode::Manual => Driver::Manual(pass),
        };

        Ok(Self {
            handle: ReachHandle { shared },
            drain: ForegroundDrain::new(dirty_rx, Box::new(notifier), drain),
            driver,
            state: ShutdownState::Running,
        })
    }

    /// A cloneable handle for producer and reader threads.
    pub fn handle(&self) -> ReachHandle<P> {
        self.handle.clone()
    }

    /// See [`ReachHandle::allocate`].
    pub fn allocate(&self, prober: P) -> Result<bool, ReachError> {
        self.handle.allocate(prober)
    }

    /// See [`ReachHandle::occupy`].
    pub fn occupy(&self, prober: &P, cells: &[CellId], full_query: bool) -> Result<(), ReachError> {
        self.handle.occupy(prober, cells, full_query)
    }

    /// See [`ReachHandle::remove`].
    pub fn remove(&self, prober: &P) -> Result<(), ReachError> {
        self.handle.remove(prober)
    }

    /// See [`ReachHandle::is_reachable`].
    pub fn is_reachable(&self, cell: CellId) -> bool {
        self.handle.is_reachable(cell)
    }

    /// See [`ReachHandle::is_reachable_with_offsets`].
    pub fn is_reachable_with_offsets(&self, cell: CellId, offsets: &[CellOffset]) -> bool {
        self.handle.is_reachable_with_offsets(cell, offsets)
    }

    /// See [`ReachHandle::reference_count`].
    pub fn reference_count(&self, cell: CellId) -> Option<i32> {
        self.handle.reference_count(cell)
    }

    /// See [`ReachHandle::is_registered`].
    pub fn is_registered(&self, prober: &P) -> bool {
        self.handle.is_registered(prober)
    }

    /// See [`ReachHandle::prober_count`].
    pub fn prober_count(&self) -> usize {
        self.handle.prober_count()
    }

    /// See [`ReachHandle::cell_count`].
    pub fn cell_count(&self) -> usize {
        self.handle.cell_count()
    }

    /// See [`ReachHandle::metrics`].
    pub fn metrics(&self) -> ReachMetrics {
        self.handle.metrics()
    }

    /// Queue `consumer` for re-evaluation by a later [`update()`](Self::update).
    pub fn enqueue(&mut self, consumer: Arc<dyn ReachabilityConsumer>) {
        if self.state == ShutdownState::Running {
            self.drain.enqueue(consumer);
        }
    }

    /// Consumers waiting for re-evaluation.
    pub fn pending_consumers(&self) -> usize {
        self.drain.pending()
    }

    /// The per-tick foreground step.
    ///
    /// Hands every cell whose reachability flipped since the last call to
    /// the notifier in one batch, then re-evaluates a bounded slice of the
    /// consumer queue. Never blocks.
    pub fn update(&mut self) -> DrainReport {
        if self.state != ShutdownState::Running {
            return DrainReport::default();
        }
        let shared = &self.handle.shared;
        let report = self
            .drain
            .update(|cell, offsets| shared.reachable_with_offsets(cell, offsets));
        shared
            .counters
            .record_drain(report.cells_notified, report.consumers_evaluated);
        report
    }

    /// Run one diff pass synchronously. Only available in
    /// [`WorkerMode::Manual`].
    pub fn run_pass(&mut self) -> Result<PassStats, ReachError> {
        if self.state != ShutdownState::Running {
            return Err(ReachError::ShuttingDown);
        }
        match &mut self.driver {
            Driver::Manual(pass) => {
                self.handle.shared.trigger.take();
                Ok(self.handle.shared.run_pass(pass))
            }
            Driver::Threaded(_) => Err(ReachError::NotManual),
        }
    }

    /// Stop the worker and release every record.
    ///
    /// 1. **Running → Stopping:** raise the destroyed flag and wake the
    ///    worker so it leaves its wait immediately.
    /// 2. **Stopping → Stopped:** join the worker, recover its diff state,
    ///    and clear the registry, the cell index and both queues.
    ///
    /// Idempotent; later calls return an empty report.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.state == ShutdownState::Stopped {
            return ShutdownReport {
                total_ms: 0,
                worker_joined: true,
                records_cleared: 0,
            };
        }

        let start = Instant::now();
        let shared = Arc::clone(&self.handle.shared);

        // Phase 1: Running → Stopping
        self.state = ShutdownState::Stopping;
        shared.destroyed.store(true, Ordering::Release);
        shared.trigger.signal();

        // Phase 2: Stopping → Stopped
        let worker_joined = match &mut self.driver {
            Driver::Threaded(join) => match join.take().map(JoinHandle::join) {
                Some(Ok(mut pass)) => {
                    pass.clear();
                    true
                }
                Some(Err(_)) => {
                    warn!("reachability worker panicked before shutdown");
                    false
                }
                None => true,
            },
            Driver::Manual(pass) => {
                pass.clear();
                true
            }
        };

        let records_cleared = shared.registry.clear();
        shared.index.clear();
        self.drain.clear();
        self.state = ShutdownState::Stopped;

        let total_ms = start.elapsed().as_millis() as u64;
        info!(
            "reachability engine shut down in {total_ms}ms ({records_cleared} records cleared)"
        );
        ShutdownReport {
            total_ms,
            worker_joined,
            records_cleared,
        }
    }
}

impl<P: ProberKey> Drop for ReachabilityEngine<P> {
    fn drop(&mut self) {
        if self.state != ShutdownState::Stopped {
            self.shutdown();
        }
    }
}

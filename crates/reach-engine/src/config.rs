//! Engine configuration, validation, and construction errors.
//!
//! [`EngineConfig`] is the input to
//! [`ReachabilityEngine::new`](crate::ReachabilityEngine::new).
//! [`validate()`](EngineConfig::validate) checks capacity and timing
//! invariants up front; invalid values are rejected, never corrected.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reach_space::CellSpace;

// ── WorkerMode ─────────────────────────────────────────────────────

/// How diff passes are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WorkerMode {
    /// One dedicated background thread, woken by the trigger.
    #[default]
    Threaded,
    /// No thread. The owner calls
    /// [`run_pass()`](crate::ReachabilityEngine::run_pass) explicitly.
    Manual,
}

// ── WorkerConfig ───────────────────────────────────────────────────

/// Background worker settings.
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Scheduling mode. Default: [`WorkerMode::Threaded`].
    pub mode: WorkerMode,
    /// Upper bound on one trigger wait, in milliseconds. The worker runs a
    /// pass when the wait times out, so a lost wakeup costs at most this
    /// much latency. Default: 100.
    pub wait_timeout_ms: u64,
    /// Name given to the worker thread. Default: `"reach-worker"`.
    pub thread_name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            mode: WorkerMode::Threaded,
            wait_timeout_ms: 100,
            thread_name: "reach-worker".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Manual mode with otherwise default settings.
    pub fn manual() -> Self {
        Self {
            mode: WorkerMode::Manual,
            ..Self::default()
        }
    }

    /// The trigger wait bound as a [`Duration`].
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}

// ── DrainConfig ────────────────────────────────────────────────────

/// Throttling of consumer re-evaluation in
/// [`update()`](crate::ReachabilityEngine::update).
///
/// Each tick evaluates `min_per_tick` consumers, plus
/// `ceil((pending - min_per_tick) / backlog_divisor)` more when the queue
/// is longer than that.
#[derive(Clone, Debug)]
pub struct DrainConfig {
    /// Consumers evaluated per tick regardless of backlog. Default: 8.
    pub min_per_tick: usize,
    /// Fraction of the remaining backlog added on top. Default: 16.
    pub backlog_divisor: usize,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            min_per_tick: 8,
            backlog_divisor: 16,
        }
    }
}

impl DrainConfig {
    /// Number of consumers to evaluate this tick with `pending` queued.
    pub fn budget(&self, pending: usize) -> usize {
        if pending <= self.min_per_tick {
            return pending;
        }
        let extra = (pending - self.min_per_tick).div_ceil(self.backlog_divisor.max(1));
        (self.min_per_tick + extra).min(pending)
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building an engine.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The cell space has zero cells.
    EmptyCellSpace,
    /// The cell count does not fit a `u32` cell id.
    CellCountOverflow {
        /// The offending cell count.
        value: usize,
    },
    /// `wait_timeout_ms` is zero.
    InvalidWaitTimeout {
        /// The configured value.
        value_ms: u64,
    },
    /// A [`DrainConfig`] invariant is violated.
    InvalidDrain {
        /// Which invariant.
        reason: String,
    },
    /// The worker thread could not be spawned.
    ThreadSpawnFailed {
        /// The OS error.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCellSpace => write!(f, "cell space has zero cells"),
            Self::CellCountOverflow { value } => {
                write!(f, "cell count {value} exceeds u32::MAX")
            }
            Self::InvalidWaitTimeout { value_ms } => {
                write!(f, "wait_timeout_ms must be at least 1, got {value_ms}")
            }
            Self::InvalidDrain { reason } => write!(f, "invalid drain config: {reason}"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {}

// ── EngineConfig ───────────────────────────────────────────────────

/// Complete configuration for a [`ReachabilityEngine`](crate::ReachabilityEngine).
#[derive(Clone)]
pub struct EngineConfig {
    /// The host's cell space. Fixes the cell count for the engine's lifetime.
    pub space: Arc<dyn CellSpace>,
    /// Worker scheduling.
    pub worker: WorkerConfig,
    /// Foreground drain throttling.
    pub drain: DrainConfig,
}

impl EngineConfig {
    /// Default worker and drain settings over `space`.
    pub fn new(space: Arc<dyn CellSpace>) -> Self {
        Self {
            space,
            worker: WorkerConfig::default(),
            drain: DrainConfig::default(),
        }
    }

    /// Switch to [`WorkerMode::Manual`].
    pub fn manual(mut self) -> Self {
        self.worker.mode = WorkerMode::Manual;
        self
    }

    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cell_count = self.space.cell_count();
        if cell_count == 0 {
            return Err(ConfigError::EmptyCellSpace);
        }
        if u32::try_from(cell_count).is_err() {
            return Err(ConfigError::CellCountOverflow { value: cell_count });
        }
        if self.worker.wait_timeout_ms == 0 {
            return Err(ConfigError::InvalidWaitTimeout {
                value_ms: self.worker.wait_timeout_ms,
            });
        }
        if self.drain.min_per_tick == 0 {
            return Err(ConfigError::InvalidDrain {
                reason: "min_per_tick must be at least 1".to_string(),
            });
        }
        if self.drain.backlog_divisor == 0 {
            return Err(ConfigError::InvalidDrain {
                reason: "backlog_divisor must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("cell_count", &self.space.cell_count())
            .field("worker", &self.worker)
            .field("drain", &self.drain)
            .finish()
    }
}

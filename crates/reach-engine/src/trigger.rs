//! Coalescing wake-up signal for the background worker.
//!
//! Built on a `bounded(1)` crossbeam channel: any number of signals sent
//! while the worker is busy collapse into a single pending wake-up, and
//! [`Trigger::signal`] never blocks the producer.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

/// Why [`Trigger::wait`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Wake {
    /// Someone called [`Trigger::signal`].
    Signalled,
    /// The timeout elapsed with no signal.
    TimedOut,
}

pub(crate) struct Trigger {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl Trigger {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        Self { tx, rx }
    }

    /// Request a pass. Non-blocking; a wake-up already pending absorbs it.
    pub fn signal(&self) {
        let _ = self.tx.try_send(());
    }

    /// Block until signalled or until `timeout` elapses.
    pub fn wait(&self, timeout: Duration) -> Wake {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => Wake::Signalled,
            // The sender lives alongside the receiver, so it cannot be
            // dropped while we are waiting.
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => Wake::TimedOut,
        }
    }

    /// Consume a pending wake-up without blocking. Returns whether one
    /// was pending.
    pub fn take(&self) -> bool {
        self.rx.try_recv().is_ok()
    }
}

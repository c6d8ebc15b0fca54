//! The background worker loop.
//!
//! The worker thread owns the [`DiffPass`] exclusively (moved in via
//! `thread::Builder::spawn`) and hands it back through its
//! `JoinHandle` on exit, so shutdown can release the applied sets
//! without any lock.

use std::sync::Arc;
use std::time::Duration;

use log::{info, trace};
use reach_core::ProberKey;

use crate::diff::DiffPass;
use crate::engine::Shared;
use crate::trigger::Wake;

pub(crate) struct WorkerLoop<P> {
    shared: Arc<Shared<P>>,
    pass: DiffPass,
    wait_timeout: Duration,
}

impl<P: ProberKey> WorkerLoop<P> {
    pub fn new(shared: Arc<Shared<P>>, pass: DiffPass, wait_timeout: Duration) -> Self {
        Self {
            shared,
            pass,
            wait_timeout,
        }
    }

    /// Run until the engine is destroyed.
    ///
    /// A timed-out wait still runs a pass, which recovers from any wake-up
    /// lost to a race with the trigger.
    pub fn run(mut self) -> DiffPass {
        info!(
            "reachability worker started ({} cells, wait {:?})",
            self.shared.cell_count(),
            self.wait_timeout
        );
        let mut passes: u64 = 0;
        loop {
            if self.shared.is_destroyed() {
                break;
            }
            if self.shared.trigger().wait(self.wait_timeout) == Wake::TimedOut {
                trace!("reachability worker woke on timeout");
            }
            if self.shared.is_destroyed() {
                break;
            }
            self.shared.run_pass(&mut self.pass);
            passes += 1;
        }
        info!("reachability worker stopped after {passes} passes");
        self.pass
    }
}

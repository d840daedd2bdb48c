//! Single-flight scan worker
//!
//! `start` spawns at most one worker thread. The worker publishes its
//! outcome through a `Signal`, which hands over the whole value at once,
//! and only then clears the active flag. The UI loop therefore never
//! sees "not active" without the outcome already being in the slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use nirscan_core::scan::{ScanError, ScanErrorKind, ScanOutcome};
use tracing::{error, info, warn};

use super::pipeline::ScanJob;

/// Worker-to-UI outcome slot
pub type OutcomeSignal = Signal<CriticalSectionRawMutex, ScanOutcome>;

/// Starts scan workers and exposes their outcome
pub struct ScanOrchestrator {
    job: Arc<dyn ScanJob>,
    active: Arc<AtomicBool>,
    outcome: &'static OutcomeSignal,
}

impl ScanOrchestrator {
    pub fn new(job: Arc<dyn ScanJob>, outcome: &'static OutcomeSignal) -> Self {
        Self {
            job,
            active: Arc::new(AtomicBool::new(false)),
            outcome,
        }
    }

    /// Whether a worker is currently running
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Spawn a worker unless one is already running
    ///
    /// Returns `false` when the start was rejected. Never blocks.
    pub fn start(&self) -> bool {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Scan already in progress, start ignored");
            return false;
        }

        // A stale outcome from an abandoned run must not answer this one
        if self.outcome.try_take().is_some() {
            info!("Discarded unread outcome from previous scan");
        }

        let job = Arc::clone(&self.job);
        let active = Arc::clone(&self.active);
        let outcome = self.outcome;
        let spawned = thread::Builder::new()
            .name("scan-worker".into())
            .spawn(move || {
                let result = job.run();
                outcome.signal(result);
                active.store(false, Ordering::Release);
            });

        if let Err(e) = spawned {
            error!("Cannot spawn scan worker: {}", e);
            self.outcome.signal(
                ScanError::new(ScanErrorKind::Acquisition, format!("worker spawn: {}", e)).into(),
            );
            self.active.store(false, Ordering::Release);
        }
        true
    }

    /// Take a published outcome, if one is waiting
    pub fn take_outcome(&self) -> Option<ScanOutcome> {
        self.outcome.try_take()
    }

    /// Force the active flag, standing in for a worker mid-publish
    #[cfg(test)]
    pub(crate) fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }
}

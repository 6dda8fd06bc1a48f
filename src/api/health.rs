//! Shared health state for the /health endpoint.
//! Updated by the analysis handler after every run.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Run counters. Updated by API handlers, read by /health.
#[derive(Default)]
pub struct HealthState {
    pub runs_completed: AtomicU64,
    pub runs_failed: AtomicU64,
    /// Unix seconds of the last completed run (0 = none).
    pub last_run_at: AtomicI64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, at_secs: i64) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
        self.last_run_at.store(at_secs, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn runs_completed(&self) -> u64 {
        self.runs_completed.load(Ordering::Relaxed)
    }

    pub fn runs_failed(&self) -> u64 {
        self.runs_failed.load(Ordering::Relaxed)
    }

    pub fn last_run_at(&self) -> Option<i64> {
        match self.last_run_at.load(Ordering::Relaxed) {
            0 => None,
            secs => Some(secs),
        }
    }
}

//! Precompute progress reporting

use tracing::{debug, info};

/// Receives progress while a reasoner precomputes its inferences
pub trait ProgressMonitor: Send + Sync {
    fn task_started(&self, _phase: &str) {}

    /// `percent` is in `0..=100`
    fn progress(&self, phase: &str, percent: u8);

    fn task_stopped(&self, _phase: &str) {}
}

impl<F> ProgressMonitor for F
where
    F: Fn(&str, u8) + Send + Sync,
{
    fn progress(&self, phase: &str, percent: u8) {
        self(phase, percent)
    }
}

/// Discards all progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressMonitor;

impl ProgressMonitor for NullProgressMonitor {
    fn progress(&self, _phase: &str, _percent: u8) {}
}

/// Logs phase boundaries at info and percentages at debug
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgressMonitor;

impl ProgressMonitor for TracingProgressMonitor {
    fn task_started(&self, phase: &str) {
        info!(phase, "Reasoner task started");
    }

    fn progress(&self, phase: &str, percent: u8) {
        debug!(phase, percent, "Reasoner progress");
    }

    fn task_stopped(&self, phase: &str) {
        info!(phase, "Reasoner task finished");
    }
}

/// Percent of `done` out of `total`, clamped to 100; an empty task is complete
pub(crate) fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}

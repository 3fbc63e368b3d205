//! Progress reporting and cooperative cancellation for long running batch operations.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Receives progress updates from a long running operation.
/// The operation polls [`ProgressNotification::cancelled`] at its natural suspension points
/// and stops early when it returns true.
pub trait ProgressNotification {
    /// Called once before the work starts with the total number of steps.
    fn reset(&mut self, _total: u64) {}

    /// Called after every completed step.
    fn tick(&mut self) {}

    /// Returns true when the operation should stop at the next suspension point.
    fn cancelled(&self) -> bool {
        false
    }
}

/// Progress implementation that ignores all updates and never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyProgress;

impl ProgressNotification for DummyProgress {}

/// Shared cancellation flag, clones observe the same state.
#[derive(Debug, Default, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        log::debug!("Cancellation requested");
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl ProgressNotification for CancellationToken {
    fn cancelled(&self) -> bool {
        self.is_cancelled()
    }
}

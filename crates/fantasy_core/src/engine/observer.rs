//! Run observers: progress reporting and cooperative cancellation.
//!
//! The runner only consults an observer between trials, so a cancelled run
//! still returns a matrix made of complete trials.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub trait SimObserver: Sync {
    fn on_trial_complete(&self, _completed: usize) {}

    /// Checked before each trial; returning true ends the run early.
    fn should_stop(&self) -> bool {
        false
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Shared flag a caller can flip from another thread.
#[derive(Debug, Default, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl SimObserver for CancellationToken {
    fn should_stop(&self) -> bool {
        self.is_cancelled()
    }
}

/// Counts finished trials and optionally stops after a budget.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    completed: AtomicUsize,
    stop_after: Option<usize>,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stopping_after(trials: usize) -> Self {
        Self { completed: AtomicUsize::new(0), stop_after: Some(trials) }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }
}

impl SimObserver for ProgressCounter {
    fn on_trial_complete(&self, _completed: usize) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    fn should_stop(&self) -> bool {
        self.stop_after.is_some_and(|limit| self.completed() >= limit)
    }
}

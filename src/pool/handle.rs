//! Task handles and the completion latch behind them

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Terminal state of a submitted task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The task body ran to completion on a worker
    Completed,
    /// The task was discarded by force-cancel before it ran
    Cancelled,
}

impl TaskOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskOutcome::Cancelled)
    }
}

/// One-shot latch resolved by the worker that finishes the task.
///
/// Resolution establishes happens-before: everything the task wrote is
/// visible to a thread that observed the latch resolve.
pub(crate) struct CompletionLatch {
    state: Mutex<Option<TaskOutcome>>,
    cond: Condvar,
}

impl CompletionLatch {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(None),
            cond: Condvar::new(),
        })
    }

    /// Resolve the latch. The first resolution wins; later calls are
    /// no-ops so a cancel racing a completion cannot flip the outcome.
    pub(crate) fn resolve(&self, outcome: TaskOutcome) {
        let mut state = self.state.lock();
        if state.is_none() {
            *state = Some(outcome);
            self.cond.notify_all();
        }
    }

    fn wait(&self) -> TaskOutcome {
        let mut state = self.state.lock();
        loop {
            if let Some(outcome) = *state {
                return outcome;
            }
            self.cond.wait(&mut state);
        }
    }

    fn peek(&self) -> Option<TaskOutcome> {
        *self.state.lock()
    }
}

/// Join handle for exactly one submitted task
pub struct TaskHandle {
    latch: Arc<CompletionLatch>,
}

impl TaskHandle {
    pub(crate) fn new(latch: Arc<CompletionLatch>) -> Self {
        Self { latch }
    }

    /// Block until the task finished (ran or was cancelled).
    pub fn wait(&self) -> TaskOutcome {
        self.latch.wait()
    }

    /// Non-blocking: has the task finished?
    pub fn is_finished(&self) -> bool {
        self.latch.peek().is_some()
    }
}

/// Barrier over a set of handles: returns only when every named task
/// has finished. `Cancelled` if any task was cancelled.
pub fn join_all(handles: &[TaskHandle]) -> TaskOutcome {
    let mut outcome = TaskOutcome::Completed;
    for handle in handles {
        if handle.wait().is_cancelled() {
            outcome = TaskOutcome::Cancelled;
        }
    }
    outcome
}

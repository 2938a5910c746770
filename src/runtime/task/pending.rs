use super::core::Runnable;
use super::id::TaskId;
use super::state::TaskState;

use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A task that was still queued when
/// [`shutdown_now`](crate::Executor::shutdown_now) drained the executor.
///
/// The task has not started. Its owner may [`run`](Self::run) it on the
/// current thread, [`cancel`](Self::cancel) it, or drop it; a task dropped
/// while still pending is cancelled so that anyone blocked on its
/// [`TaskHandle`](crate::TaskHandle) is released.
pub struct PendingTask {
    task: Option<Arc<dyn Runnable>>,
}

impl PendingTask {
    pub(crate) fn new(task: Arc<dyn Runnable>) -> Self {
        Self { task: Some(task) }
    }

    fn task(&self) -> &Arc<dyn Runnable> {
        self.task.as_ref().expect("pending task already consumed")
    }

    /// Returns the id of the task.
    pub fn id(&self) -> TaskId {
        self.task().id()
    }

    /// Returns the current lifecycle state of the task.
    pub fn state(&self) -> TaskState {
        self.task().state()
    }

    /// Whether the task has reached a terminal state, e.g. because it was
    /// cancelled through its handle.
    pub fn is_done(&self) -> bool {
        self.state().is_terminal()
    }

    /// Whether the task was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state() == TaskState::Cancelled
    }

    /// Cancels the task. Returns `false` if it was already finished.
    pub fn cancel(&self) -> bool {
        self.task().cancel(false)
    }

    /// Runs the task on the calling thread.
    ///
    /// Does nothing if the task was cancelled in the meantime.
    pub fn run(mut self) {
        if let Some(task) = self.task.take() {
            task.run();
        }
    }
}

impl Drop for PendingTask {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            if task.cancel(false) {
                trace!(task = %task.id(), "abandoned pending task cancelled");
            }
        }
    }
}

impl fmt::Debug for PendingTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.task {
            Some(task) => f
                .debug_struct("PendingTask")
                .field("id", &task.id())
                .field("state", &task.state())
                .finish(),
            None => f.write_str("PendingTask(consumed)"),
        }
    }
}

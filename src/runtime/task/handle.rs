use super::core::Task;
use super::id::TaskId;
use super::state::TaskState;
use crate::error::Error;
use crate::sync::WaitError;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A handle to a submitted task.
///
/// A `TaskHandle` lets the submitter observe the task: poll its state,
/// block for its result (optionally with a deadline), or cancel it.
///
/// Dropping the handle does **not** cancel the task; it only discards the
/// ability to observe its result.
pub struct TaskHandle<T> {
    /// Shared reference to the underlying task.
    task: Arc<Task<T>>,
}

impl<T: Send + 'static> TaskHandle<T> {
    pub(crate) fn new(task: Arc<Task<T>>) -> Self {
        Self { task }
    }

    /// Returns the id of the task.
    pub fn id(&self) -> TaskId {
        self.task.id()
    }

    /// Returns the current lifecycle state of the task.
    pub fn state(&self) -> TaskState {
        self.task.state()
    }

    /// Whether the task has completed, failed, or been cancelled.
    ///
    /// Once this returns `true` it keeps returning `true`.
    pub fn is_done(&self) -> bool {
        self.state().is_terminal()
    }

    /// Whether the task was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state() == TaskState::Cancelled
    }

    /// Attempts to cancel the task.
    ///
    /// A pending task will never run. A running task is marked cancelled
    /// immediately; if `may_interrupt_running` is set the worker thread is
    /// also [interrupted](crate::interrupt), which the body only observes
    /// if it checks.
    ///
    /// Returns `true` iff this call performed the transition to
    /// [`TaskState::Cancelled`].
    pub fn cancel(&self, may_interrupt_running: bool) -> bool {
        self.task.cancel(may_interrupt_running)
    }

    /// Blocks until the task is finished, without reading its result.
    ///
    /// # Errors
    ///
    /// [`Error::Interrupted`] if the calling thread is interrupted first.
    pub fn wait(&self) -> Result<(), Error> {
        self.task.wait(None).map_err(|e| wait_error(e, None))
    }

    /// Blocks until the task is finished or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// [`Error::TimedOut`] if the task is still unfinished after `timeout`,
    /// [`Error::Interrupted`] if the calling thread is interrupted first.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<(), Error> {
        self.task
            .wait(deadline_after(timeout))
            .map_err(|e| wait_error(e, Some(timeout)))
    }

    /// Blocks until the task is finished and returns a copy of its result.
    ///
    /// Every call on a finished task observes the same outcome.
    ///
    /// # Errors
    ///
    /// - [`Error::Execution`] if the body returned an error or panicked,
    /// - [`Error::Cancelled`] if the task was cancelled,
    /// - [`Error::Interrupted`] if the calling thread is interrupted while
    ///   waiting. The task itself is left untouched.
    pub fn get(&self) -> Result<T, Error>
    where
        T: Clone,
    {
        self.task.get(None).map_err(|e| wait_error(e, None))?
    }

    /// Like [`get`](Self::get), but gives up with [`Error::TimedOut`] once
    /// `timeout` has elapsed. A timeout does not affect the task.
    pub fn get_timeout(&self, timeout: Duration) -> Result<T, Error>
    where
        T: Clone,
    {
        self.task
            .get(deadline_after(timeout))
            .map_err(|e| wait_error(e, Some(timeout)))?
    }

    /// Blocks until the task is finished and moves its result out.
    ///
    /// Unlike [`get`](Self::get) this does not require `T: Clone`.
    pub fn join(self) -> Result<T, Error> {
        self.task.take(None).map_err(|e| wait_error(e, None))?
    }

    /// Like [`join`](Self::join), but gives up with [`Error::TimedOut`]
    /// once `timeout` has elapsed. The handle is consumed either way; the
    /// task itself keeps running.
    pub fn join_timeout(self, timeout: Duration) -> Result<T, Error> {
        self.task
            .take(deadline_after(timeout))
            .map_err(|e| wait_error(e, Some(timeout)))?
    }

    /// Waits against an absolute deadline. Used by the bulk operations,
    /// which share one deadline across many handles.
    pub(crate) fn wait_deadline(&self, deadline: Option<Instant>) -> Result<(), WaitError> {
        self.task.wait(deadline)
    }

    /// Moves the result out once finished, against an absolute deadline.
    pub(crate) fn take_deadline(
        &self,
        deadline: Option<Instant>,
    ) -> Result<Result<T, Error>, WaitError> {
        self.task.take(deadline)
    }
}

impl<T: Send + 'static> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id())
            .field("state", &self.state())
            .finish()
    }
}

/// Converts a relative timeout into a deadline, `None` if it overflows.
pub(crate) fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

fn wait_error(err: WaitError, timeout: Option<Duration>) -> Error {
    match err {
        WaitError::Interrupted => Error::Interrupted,
        WaitError::TimedOut => Error::TimedOut(timeout.unwrap_or_default()),
    }
}

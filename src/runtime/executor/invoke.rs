use super::core::Executor;
use crate::error::{BoxError, Error, TaskFailure};
use crate::runtime::task::handle::deadline_after;
use crate::runtime::task::{Body, TaskHandle};
use crate::sync::WaitError;

use std::time::{Duration, Instant};
use tracing::debug;

impl Executor {
    /// Submits every task and blocks until all of them are finished.
    ///
    /// The returned handles are in input order and all report
    /// [`is_done`](TaskHandle::is_done). A task that failed or panicked is
    /// reported through its handle, not as an error of this call.
    ///
    /// # Errors
    ///
    /// - [`Error::Rejected`] if the executor has been shut down. No task
    ///   is queued in that case.
    /// - [`Error::Interrupted`] if the calling thread is interrupted while
    ///   waiting. Every task is cancelled before returning.
    pub fn invoke_all<I, F, T, E>(&self, tasks: I) -> Result<Vec<TaskHandle<T>>, Error>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<BoxError>,
    {
        let handles = self.enqueue_all(bodies(tasks))?;
        await_all(&handles, None)?;

        Ok(handles)
    }

    /// Like [`invoke_all`](Self::invoke_all), but gives up once `timeout`
    /// has elapsed since the call started.
    ///
    /// Running out of time is not an error: the tasks that had not
    /// finished are cancelled (interrupting the running one) and the
    /// handles are returned as usual, all of them done.
    ///
    /// # Errors
    ///
    /// Same as [`invoke_all`](Self::invoke_all).
    pub fn invoke_all_timeout<I, F, T, E>(
        &self,
        tasks: I,
        timeout: Duration,
    ) -> Result<Vec<TaskHandle<T>>, Error>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<BoxError>,
    {
        let deadline = deadline_after(timeout);

        let handles = self.enqueue_all(bodies(tasks))?;
        await_all(&handles, deadline)?;

        Ok(handles)
    }

    /// Submits every task and returns the value of the first one, in
    /// input order, that completes successfully.
    ///
    /// The remaining tasks are cancelled on return, whatever the outcome.
    ///
    /// # Errors
    ///
    /// - [`Error::NoTasks`] if `tasks` is empty.
    /// - [`Error::Rejected`] if the executor has been shut down.
    /// - [`Error::Execution`] with the last failure if no task succeeded.
    /// - [`Error::Interrupted`] if the calling thread is interrupted while
    ///   waiting.
    pub fn invoke_any<I, F, T, E>(&self, tasks: I) -> Result<T, Error>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<BoxError>,
    {
        self.race(bodies(tasks), None)
    }

    /// Like [`invoke_any`](Self::invoke_any), but fails with
    /// [`Error::TimedOut`] if no task has succeeded once `timeout` has
    /// elapsed since the call started.
    pub fn invoke_any_timeout<I, F, T, E>(&self, tasks: I, timeout: Duration) -> Result<T, Error>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<BoxError>,
    {
        self.race(bodies(tasks), Some(timeout))
    }

    fn race<T: Send + 'static>(
        &self,
        bodies: Vec<Body<T>>,
        timeout: Option<Duration>,
    ) -> Result<T, Error> {
        let deadline = timeout.and_then(deadline_after);

        if bodies.is_empty() {
            return Err(Error::NoTasks);
        }

        let handles = self.enqueue_all(bodies)?;
        let result = first_success(&handles, deadline, timeout);
        cancel_all(&handles);

        result
    }
}

/// Adapts user closures to task bodies.
fn bodies<I, F, T, E>(tasks: I) -> Vec<Body<T>>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<BoxError>,
{
    tasks
        .into_iter()
        .map(|task| -> Body<T> { Box::new(move || task().map_err(TaskFailure::from_error)) })
        .collect()
}

/// Waits for every handle in order.
///
/// On timeout every handle is cancelled and the wait ends normally. On
/// interruption every handle is cancelled and the interruption reported.
fn await_all<T: Send + 'static>(
    handles: &[TaskHandle<T>],
    deadline: Option<Instant>,
) -> Result<(), Error> {
    for handle in handles {
        match handle.wait_deadline(deadline) {
            Ok(()) => {}
            Err(WaitError::TimedOut) => {
                debug!(tasks = handles.len(), "invoke_all deadline reached, cancelling");
                cancel_all(handles);
                return Ok(());
            }
            Err(WaitError::Interrupted) => {
                debug!(tasks = handles.len(), "invoke_all interrupted, cancelling");
                cancel_all(handles);
                return Err(Error::Interrupted);
            }
        }
    }

    Ok(())
}

/// Returns the first successful result, in input order.
fn first_success<T: Send + 'static>(
    handles: &[TaskHandle<T>],
    deadline: Option<Instant>,
    timeout: Option<Duration>,
) -> Result<T, Error> {
    let mut last_failure = None;

    for handle in handles {
        match handle.take_deadline(deadline) {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(Error::Execution(failure))) => last_failure = Some(failure),
            Ok(Err(err)) => return Err(err),
            Err(WaitError::TimedOut) => {
                debug!(tasks = handles.len(), "invoke_any deadline reached");
                return Err(Error::TimedOut(timeout.unwrap_or_default()));
            }
            Err(WaitError::Interrupted) => {
                debug!(tasks = handles.len(), "invoke_any interrupted");
                return Err(Error::Interrupted);
            }
        }
    }

    Err(last_failure.map_or(Error::NoTasks, Error::Execution))
}

/// Cancels every handle, interrupting the running one.
///
/// Goes back to front: every queued task is cancelled before the running
/// one is interrupted, so the worker never starts another task of the batch.
fn cancel_all<T: Send + 'static>(handles: &[TaskHandle<T>]) {
    for handle in handles.iter().rev() {
        handle.cancel(true);
    }
}

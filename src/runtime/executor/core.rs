use super::worker::Worker;
use crate::error::{BoxError, Error, TaskFailure};
use crate::interrupt::{self, Interrupter};
use crate::runtime::builder::{Config, ExecutorBuilder, PermissionCheck};
use crate::runtime::queue::{QueueHandle, SubmissionQueue};
use crate::runtime::task::handle::deadline_after;
use crate::runtime::task::{Body, PendingTask, Runnable, Task, TaskHandle};
use crate::sync::{Monitor, WaitError};

use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// A task executor backed by a single worker thread.
///
/// Tasks run one at a time, in submission order, on a thread the executor
/// owns. Submission never blocks; it returns a [`TaskHandle`] that can be
/// used to wait for, or cancel, the task.
///
/// The executor stops accepting work once [`shutdown`](Self::shutdown) or
/// [`shutdown_now`](Self::shutdown_now) has been called. Dropping it
/// performs a graceful shutdown and waits for the worker to finish the
/// queued tasks.
///
/// # Examples
///
/// ```rust,ignore
/// let executor = Executor::new();
///
/// let handle = executor.submit(|| Ok::<_, solo::Error>(6 * 7))?;
/// assert_eq!(handle.get()?, 42);
///
/// executor.shutdown()?;
/// ```
pub struct Executor {
    /// Closed by the first shutdown request, never reopened.
    queue: QueueHandle,

    /// Set by the worker when its loop has returned.
    terminated: Arc<Monitor<bool>>,

    /// Interrupts the worker thread.
    worker_interrupter: Interrupter,

    /// Joined on drop.
    worker: Option<JoinHandle<()>>,

    permission: Option<PermissionCheck>,
}

impl Executor {
    /// Creates an executor with the default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the worker thread cannot be spawned. Use
    /// [`ExecutorBuilder::build`] to handle that case.
    pub fn new() -> Self {
        ExecutorBuilder::new()
            .build()
            .expect("failed to spawn executor worker thread")
    }

    /// Returns a builder for configuring an executor.
    pub fn builder() -> ExecutorBuilder {
        ExecutorBuilder::new()
    }

    /// Starts the worker thread and waits until it is ready to take tasks.
    pub(crate) fn start(config: Config) -> Result<Self, Error> {
        let queue: QueueHandle = Arc::new(SubmissionQueue::new());
        let terminated = Arc::new(Monitor::new(false));

        let worker = Worker::new(
            queue.clone(),
            terminated.clone(),
            config.on_thread_start,
            config.on_thread_stop,
        );

        let mut builder = thread::Builder::new().name(config.thread_name.clone());
        if let Some(size) = config.stack_size {
            builder = builder.stack_size(size);
        }

        let (tx, rx) = mpsc::channel();
        let handle = builder.spawn(move || {
            // The receiver outlives this send.
            let _ = tx.send(interrupt::current());
            worker.run();
        })?;

        let worker_interrupter = rx
            .recv()
            .map_err(|_| io::Error::other("worker thread exited during startup"))?;

        debug!(thread = %config.thread_name, "executor started");

        Ok(Self {
            queue,
            terminated,
            worker_interrupter,
            worker: Some(handle),
            permission: config.shutdown_permission,
        })
    }

    /// Submits a fallible task whose result is reported through the
    /// returned handle.
    ///
    /// An `Err` returned by the body, or a panic, completes the task as
    /// failed; [`TaskHandle::get`] then reports [`Error::Execution`].
    ///
    /// # Errors
    ///
    /// [`Error::Rejected`] if the executor has been shut down.
    pub fn submit<F, T, E>(&self, task: F) -> Result<TaskHandle<T>, Error>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<BoxError>,
    {
        self.enqueue(Box::new(move || task().map_err(TaskFailure::from_error)))
    }

    /// Submits an action. The handle completes with `()`.
    ///
    /// # Errors
    ///
    /// [`Error::Rejected`] if the executor has been shut down.
    pub fn spawn<F>(&self, action: F) -> Result<TaskHandle<()>, Error>
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue(Box::new(move || {
            action();
            Ok(())
        }))
    }

    /// Submits an action. The handle completes with `value` once the
    /// action has run.
    ///
    /// # Errors
    ///
    /// [`Error::Rejected`] if the executor has been shut down.
    pub fn spawn_with<F, T>(&self, action: F, value: T) -> Result<TaskHandle<T>, Error>
    where
        F: FnOnce() + Send + 'static,
        T: Send + 'static,
    {
        self.enqueue(Box::new(move || {
            action();
            Ok(value)
        }))
    }

    /// Fire-and-forget submission of an action.
    ///
    /// # Errors
    ///
    /// [`Error::Rejected`] if the executor has been shut down.
    pub fn execute<F>(&self, action: F) -> Result<(), Error>
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn(action).map(drop)
    }

    /// Requests a graceful shutdown.
    ///
    /// New submissions are rejected from now on. Tasks already queued
    /// still run, after which the worker exits. Does not wait; see
    /// [`await_termination`](Self::await_termination). Calling it again
    /// has no further effect.
    ///
    /// # Errors
    ///
    /// [`Error::PermissionDenied`] if the configured permission check
    /// refuses. Nothing changes in that case.
    pub fn shutdown(&self) -> Result<(), Error> {
        self.check_permission()?;

        if self.queue.close() {
            debug!("graceful shutdown requested");
        }

        Ok(())
    }

    /// Requests an immediate shutdown.
    ///
    /// New submissions are rejected, the tasks that have not started are
    /// removed from the queue and returned, and the worker thread is
    /// interrupted. A running task keeps running unless it observes the
    /// interrupt.
    ///
    /// Dropping a returned [`PendingTask`] cancels it, which releases
    /// anyone waiting on its handle.
    ///
    /// # Errors
    ///
    /// [`Error::PermissionDenied`] if the configured permission check
    /// refuses. Nothing changes in that case.
    pub fn shutdown_now(&self) -> Result<Vec<PendingTask>, Error> {
        self.check_permission()?;

        let drained = self.queue.close_and_drain();
        self.worker_interrupter.interrupt();

        debug!(drained = drained.len(), "immediate shutdown requested");

        Ok(drained.into_iter().map(PendingTask::new).collect())
    }

    /// Whether a shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.queue.is_closed()
    }

    /// Whether the worker thread has finished.
    pub fn is_terminated(&self) -> bool {
        *self.terminated.lock()
    }

    /// Blocks until the worker thread has finished or `timeout` elapses.
    ///
    /// Returns whether the executor terminated. Does not request a
    /// shutdown by itself.
    ///
    /// # Errors
    ///
    /// [`Error::Interrupted`] if the calling thread is interrupted first.
    pub fn await_termination(&self, timeout: Duration) -> Result<bool, Error> {
        match self
            .terminated
            .wait_for(deadline_after(timeout), |done| done.then_some(()))
        {
            Ok(()) => Ok(true),
            Err(WaitError::TimedOut) => Ok(false),
            Err(WaitError::Interrupted) => Err(Error::Interrupted),
        }
    }

    /// Builds a task around `body` and queues it.
    ///
    /// Rejection is decided by the queue, under the same lock that closes it.
    fn enqueue<T: Send + 'static>(&self, body: Body<T>) -> Result<TaskHandle<T>, Error> {
        let task = Arc::new(Task::new(body));
        self.queue.push(task.clone())?;

        trace!(task = %task.id(), "task submitted");

        Ok(TaskHandle::new(task))
    }

    /// Builds tasks around every body and queues them as one batch.
    pub(super) fn enqueue_all<T: Send + 'static>(
        &self,
        bodies: Vec<Body<T>>,
    ) -> Result<Vec<TaskHandle<T>>, Error> {
        let tasks: Vec<Arc<Task<T>>> = bodies
            .into_iter()
            .map(|body| Arc::new(Task::new(body)))
            .collect();

        self.queue.push_all(
            tasks
                .iter()
                .map(|task| task.clone() as Arc<dyn Runnable>)
                .collect(),
        )?;

        trace!(count = tasks.len(), "task batch submitted");

        Ok(tasks.into_iter().map(TaskHandle::new).collect())
    }

    fn check_permission(&self) -> Result<(), Error> {
        match &self.permission {
            Some(check) => check().map_err(|reason| {
                warn!(%reason, "shutdown refused");
                Error::PermissionDenied(reason)
            }),
            None => Ok(()),
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        self.queue.close();

        let Some(handle) = self.worker.take() else {
            return;
        };

        // Dropped by one of its own tasks: the worker cannot join itself.
        if handle.thread().id() == thread::current().id() {
            return;
        }

        if handle.join().is_err() {
            warn!("executor worker thread panicked");
        }
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("is_shutdown", &self.is_shutdown())
            .field("is_terminated", &self.is_terminated())
            .field("queued", &self.queue.len())
            .finish()
    }
}

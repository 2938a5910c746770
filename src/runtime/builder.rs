use super::executor::Executor;
use crate::error::Error;

use std::fmt;
use std::sync::Arc;

/// Hook run on the worker thread.
pub(crate) type Callback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Permission check consulted before shutting down.
pub(crate) type PermissionCheck = Arc<dyn Fn() -> Result<(), String> + Send + Sync + 'static>;

/// Default name of the worker thread.
const DEFAULT_THREAD_NAME: &str = "solo-worker";

/// Builder for configuring and creating an [`Executor`].
///
/// The execution model itself is fixed (one worker, FIFO); the builder
/// only configures the worker thread and the shutdown policy.
///
/// # Examples
///
/// ```rust,ignore
/// let executor = ExecutorBuilder::new()
///     .thread_name("indexer")
///     .on_thread_start(|| tracing::info!("indexer up"))
///     .build()?;
/// ```
pub struct ExecutorBuilder {
    /// Name given to the worker thread.
    thread_name: String,

    /// Stack size of the worker thread, platform default if `None`.
    stack_size: Option<usize>,

    on_thread_start: Option<Callback>,
    on_thread_stop: Option<Callback>,

    /// Consulted by `shutdown` and `shutdown_now`.
    shutdown_permission: Option<PermissionCheck>,
}

/// Settings consumed by [`Executor`] when it starts.
pub(crate) struct Config {
    pub(crate) thread_name: String,
    pub(crate) stack_size: Option<usize>,
    pub(crate) on_thread_start: Option<Callback>,
    pub(crate) on_thread_stop: Option<Callback>,
    pub(crate) shutdown_permission: Option<PermissionCheck>,
}

impl ExecutorBuilder {
    /// Creates a new `ExecutorBuilder` with default configuration.
    pub fn new() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            stack_size: None,
            on_thread_start: None,
            on_thread_stop: None,
            shutdown_permission: None,
        }
    }

    /// Sets the name of the worker thread.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Sets the stack size, in bytes, of the worker thread.
    ///
    /// # Panics
    ///
    /// Panics if `size == 0`.
    pub fn stack_size(mut self, size: usize) -> Self {
        assert!(size > 0, "stack_size must be > 0");

        self.stack_size = Some(size);
        self
    }

    /// Runs `f` on the worker thread before it starts taking tasks.
    pub fn on_thread_start<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_thread_start = Some(Arc::new(f));
        self
    }

    /// Runs `f` on the worker thread after it has dequeued the shutdown
    /// sentinel, just before the thread exits.
    pub fn on_thread_stop<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_thread_stop = Some(Arc::new(f));
        self
    }

    /// Installs a permission check for [`Executor::shutdown`] and
    /// [`Executor::shutdown_now`].
    ///
    /// The check runs on the calling thread. If it returns `Err(reason)`
    /// the shutdown fails with [`Error::PermissionDenied`] and nothing
    /// changes.
    pub fn shutdown_permission<F>(mut self, check: F) -> Self
    where
        F: Fn() -> Result<(), String> + Send + Sync + 'static,
    {
        self.shutdown_permission = Some(Arc::new(check));
        self
    }

    /// Builds the executor and starts its worker thread.
    ///
    /// # Errors
    ///
    /// [`Error::Spawn`] if the worker thread cannot be created.
    pub fn build(self) -> Result<Executor, Error> {
        Executor::start(Config {
            thread_name: self.thread_name,
            stack_size: self.stack_size,
            on_thread_start: self.on_thread_start,
            on_thread_stop: self.on_thread_stop,
            shutdown_permission: self.shutdown_permission,
        })
    }
}

impl Default for ExecutorBuilder {
    /// Creates a default `ExecutorBuilder`.
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExecutorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorBuilder")
            .field("thread_name", &self.thread_name)
            .field("stack_size", &self.stack_size)
            .field("on_thread_start", &self.on_thread_start.is_some())
            .field("on_thread_stop", &self.on_thread_stop.is_some())
            .field("shutdown_permission", &self.shutdown_permission.is_some())
            .finish()
    }
}

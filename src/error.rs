//! Error types for the executor.

use std::any::Any;
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// A boxed error that can cross threads.
///
/// Task bodies may fail with any error convertible into this type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for executor and task-handle operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A task was submitted after shutdown had been requested.
    #[error("executor has been shut down, submission rejected")]
    Rejected,

    /// `invoke_any` was called without any task to race.
    #[error("cannot race an empty collection of tasks")]
    NoTasks,

    /// The configured shutdown permission hook refused the request.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The waiting thread was interrupted.
    #[error("interrupted while waiting")]
    Interrupted,

    /// A bounded wait ran out of time.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// The task body failed.
    #[error("task execution failed")]
    Execution(#[source] TaskFailure),

    /// The task was cancelled before it produced a result.
    #[error("task was cancelled")]
    Cancelled,

    /// The worker thread could not be started.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
}

impl Error {
    /// Returns the underlying task failure, if this is an execution error.
    pub fn failure(&self) -> Option<&TaskFailure> {
        match self {
            Error::Execution(failure) => Some(failure),
            _ => None,
        }
    }

    /// Whether this error reports an expired deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::TimedOut(_))
    }

    /// Whether this error reports an interrupted wait.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Interrupted)
    }
}

/// The reason a task body did not complete successfully.
///
/// Failures are reference counted so that every observer of a handle
/// sees the same cause.
#[derive(thiserror::Error, Debug, Clone)]
pub enum TaskFailure {
    /// The body returned an error. Display and `source()` are those of the
    /// wrapped error.
    #[error(transparent)]
    Error(Arc<dyn std::error::Error + Send + Sync + 'static>),

    /// The body panicked; the payload message is kept when it is a string.
    #[error("task panicked: {0}")]
    Panic(String),
}

impl TaskFailure {
    pub(crate) fn from_error(err: impl Into<BoxError>) -> Self {
        TaskFailure::Error(Arc::from(err.into()))
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };

        TaskFailure::Panic(message)
    }

    /// Returns the error the body failed with, or `None` for a panic.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            TaskFailure::Error(err) => Some(err.as_ref()),
            TaskFailure::Panic(_) => None,
        }
    }

    /// Whether the body panicked instead of returning an error.
    pub fn is_panic(&self) -> bool {
        matches!(self, TaskFailure::Panic(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn execution_error_exposes_cause_as_source() {
        let failure = TaskFailure::from_error("disk on fire");
        let err = Error::Execution(failure);

        let source = err.source().expect("execution errors carry a source");
        assert_eq!(source.to_string(), "disk on fire");
        assert_eq!(err.failure().unwrap().cause().unwrap().to_string(), "disk on fire");
    }

    #[test]
    fn execution_error_keeps_the_cause_chain() {
        #[derive(thiserror::Error, Debug)]
        #[error("index rebuild failed")]
        struct Rebuild(#[source] io::Error);

        let failure = TaskFailure::from_error(Rebuild(io::Error::other("disk full")));
        let err = Error::Execution(failure);

        let failure = err.source().expect("execution errors carry a source");
        assert_eq!(failure.to_string(), "index rebuild failed");

        let root = failure.source().expect("wrapped error keeps its source");
        assert_eq!(root.to_string(), "disk full");
        assert!(root.source().is_none());
    }

    #[test]
    fn panic_payloads_become_messages() {
        let failure = TaskFailure::from_panic(Box::new("boom"));
        assert!(failure.is_panic());
        assert_eq!(failure.to_string(), "task panicked: boom");

        let failure = TaskFailure::from_panic(Box::new(String::from("owned boom")));
        assert_eq!(failure.to_string(), "task panicked: owned boom");

        let failure = TaskFailure::from_panic(Box::new(42_u8));
        assert_eq!(failure.to_string(), "task panicked: non-string panic payload");
        assert!(failure.cause().is_none());
    }
}

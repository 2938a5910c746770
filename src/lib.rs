//! # Solo
//!
//! **Solo** is a single-worker task executor.
//!
//! Every [`Executor`] owns exactly one background thread that runs the
//! submitted tasks one at a time, in submission order. Submitters get a
//! [`TaskHandle`] back immediately and can use it to wait for the result,
//! with or without a timeout, or to cancel the task.
//!
//! On top of single submissions the executor offers:
//!
//! - **Bulk operations**: [`Executor::invoke_all`] waits for a batch,
//!   [`Executor::invoke_any`] returns the first successful result
//! - **Two shutdown modes**: a graceful [`Executor::shutdown`] that lets the
//!   queue drain, and [`Executor::shutdown_now`] that hands the unstarted
//!   tasks back and interrupts the running one
//! - **Cooperative interruption** through the [`interrupt`] module, which
//!   every blocking call of this crate observes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solo::{Executor, interrupt};
//! use std::time::Duration;
//!
//! fn main() -> Result<(), solo::Error> {
//!     let executor = Executor::new();
//!
//!     let handle = executor.submit(|| {
//!         interrupt::sleep(Duration::from_millis(100))?;
//!         Ok::<_, solo::Error>("done")
//!     })?;
//!
//!     assert_eq!(handle.get()?, "done");
//!
//!     executor.shutdown()?;
//!     executor.await_termination(Duration::from_secs(1))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (submissions, lifecycle changes,
//! panicking task bodies) and never installs a subscriber itself.

mod error;
mod runtime;
mod sync;

pub mod interrupt;

pub use error::{BoxError, Error, TaskFailure};
pub use runtime::Executor;
pub use runtime::builder::ExecutorBuilder;
pub use runtime::task;
pub use runtime::task::{PendingTask, TaskHandle, TaskId, TaskState};

pub use solo_macros::tasks;

/// A boxed task, as accepted by the bulk operations.
///
/// Collections of differently-typed closures must be boxed to share one
/// element type; the [`tasks!`] macro does that.
pub type Callable<T> = Box<dyn FnOnce() -> Result<T, BoxError> + Send + 'static>;

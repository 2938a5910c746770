//! Task primitives.
//!
//! This module defines how the executor represents submitted work:
//!
//! - [`TaskHandle`]: the submitter's view of a task (state, result,
//!   cancellation),
//! - [`TaskState`]: the observable lifecycle states,
//! - [`TaskId`]: process-unique task identifiers,
//! - [`PendingTask`]: tasks handed back by `shutdown_now`,
//! - the internal `Task` / `Runnable` pair the queue and worker operate on.

pub(crate) mod core;
pub(crate) mod handle;
pub(crate) mod id;
pub(crate) mod pending;
pub(crate) mod state;

pub(crate) use self::core::{Body, Runnable, Task};

pub use handle::TaskHandle;
pub use id::{TaskId, try_id};
pub use pending::PendingTask;
pub use state::TaskState;

//! The executor.
//!
//! This module ties the submission queue and the worker thread together
//! behind the public [`Executor`] type.
//!
//! It is composed of:
//! - [`core`]: the executor facade, submission and lifecycle management,
//! - [`worker`]: the single thread that runs tasks in FIFO order,
//! - [`invoke`]: the bulk operations (`invoke_all`, `invoke_any` and
//!   their timed variants).

pub(crate) mod core;
pub(crate) mod invoke;
pub(crate) mod worker;

pub use self::core::Executor;

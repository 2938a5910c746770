//! Core runtime components.
//!
//! This module contains the building blocks of the executor:
//!
//! - the submission queue shared by submitters and the worker,
//! - the worker thread and the executor facade around it,
//! - the task representation and the handles given to submitters,
//! - the builder used to configure all of the above.
//!
//! Most users only need [`Executor`], [`ExecutorBuilder`](crate::ExecutorBuilder)
//! and [`TaskHandle`](task::TaskHandle).

mod executor;
mod queue;

pub(crate) mod builder;

pub mod task;

pub use executor::Executor;

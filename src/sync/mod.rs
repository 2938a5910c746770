//! Blocking synchronization primitives used by the executor.
//!
//! Every place where a thread of this crate may suspend (the worker on
//! the submission queue, callers on task handles, `await_termination`,
//! interruptible sleeps) goes through a [`Monitor`]. A blocked thread
//! registers the monitor it sleeps on with its
//! [`Interrupter`](crate::interrupt::Interrupter), which can then wake
//! it up.

mod monitor;

pub(crate) use monitor::{Monitor, WaitError, Wake};

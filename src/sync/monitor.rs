use crate::interrupt;

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::Arc;
use std::time::Instant;

/// Something a blocked thread can be woken from.
///
/// Implemented by [`Monitor`] so that an interrupt can reach a thread
/// without knowing what state the thread is waiting on.
pub(crate) trait Wake: Send + Sync {
    /// Wakes every thread currently waiting on this object.
    fn wake(&self);
}

/// Why a [`Monitor::wait_for`] call gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitError {
    /// The waiting thread was interrupted. Its interrupt flag is cleared.
    Interrupted,

    /// The deadline passed before the condition held.
    TimedOut,
}

/// A mutex-protected state paired with a condition variable.
///
/// This is the classic monitor: state changes are made under the lock
/// and followed by [`notify_all`](Self::notify_all); waiters re-check
/// their condition every time they are woken.
pub(crate) struct Monitor<S> {
    /// The protected state.
    state: Mutex<S>,

    /// Signalled whenever `state` changes in a way waiters care about.
    cond: Condvar,
}

impl<S> Monitor<S> {
    /// Creates a monitor around the given initial state.
    pub(crate) fn new(state: S) -> Self {
        Self {
            state: Mutex::new(state),
            cond: Condvar::new(),
        }
    }

    /// Locks the state without waiting on any condition.
    pub(crate) fn lock(&self) -> MutexGuard<'_, S> {
        self.state.lock()
    }

    /// Wakes all waiters so they re-evaluate their condition.
    ///
    /// Callers normally hold the lock while notifying.
    pub(crate) fn notify_all(&self) {
        self.cond.notify_all();
    }

    /// Waits for the next notification, ignoring interrupts.
    ///
    /// Only used for short internal hand-offs that must not be abandoned
    /// halfway.
    pub(crate) fn wait(&self, guard: &mut MutexGuard<'_, S>) {
        self.cond.wait(guard);
    }
}

impl<S: Send + 'static> Monitor<S> {
    /// Blocks until `poll` yields a value, the deadline passes, or the
    /// calling thread is interrupted.
    ///
    /// `poll` runs under the lock, first before any waiting, so a
    /// condition that already holds is returned immediately even when an
    /// interrupt is pending. It may mutate the state, e.g. to take the
    /// value it was waiting for.
    ///
    /// # Arguments
    ///
    /// * `deadline` - Absolute instant to give up at, `None` to wait forever.
    /// * `poll` - Returns `Some` once the wait is over.
    pub(crate) fn wait_for<R, F>(
        self: &Arc<Self>,
        deadline: Option<Instant>,
        mut poll: F,
    ) -> Result<R, WaitError>
    where
        F: FnMut(&mut S) -> Option<R>,
    {
        // Register before taking the lock: an interrupter that misses the
        // registration is guaranteed to have raised the flag early enough
        // for the check below to see it.
        let blocked = interrupt::block_on(self.clone());
        let mut guard = self.state.lock();

        loop {
            if let Some(ready) = poll(&mut guard) {
                return Ok(ready);
            }

            if blocked.take_interrupt() {
                return Err(WaitError::Interrupted);
            }

            match deadline {
                None => self.cond.wait(&mut guard),
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return Err(WaitError::TimedOut);
                    }

                    self.cond.wait_until(&mut guard, deadline);
                }
            }
        }
    }
}

impl<S: Send> Wake for Monitor<S> {
    fn wake(&self) {
        // Taking the lock orders this notification after the waiter's
        // last flag check.
        let _guard = self.state.lock();
        self.cond.notify_all();
    }
}

//! Cooperative thread interruption.
//!
//! Every thread has an interrupt flag. Raising it through an
//! [`Interrupter`] does not stop the thread: it wakes the thread if it is
//! blocked in one of this crate's blocking calls (which then fail with
//! [`Error::Interrupted`]) and otherwise stays raised until the thread
//! looks at it.
//!
//! The executor interrupts its worker on [`shutdown_now`] and when a
//! running task is cancelled with `may_interrupt_running`. Long-running
//! task bodies cooperate by calling [`check`], [`interrupted`], or by
//! sleeping through [`sleep`].
//!
//! ```rust,ignore
//! let handle = executor.submit(|| {
//!     for chunk in work {
//!         solo::interrupt::check()?;
//!         process(chunk);
//!     }
//!     Ok::<_, solo::Error>(())
//! })?;
//! ```
//!
//! [`shutdown_now`]: crate::Executor::shutdown_now

use crate::error::Error;
use crate::sync::{Monitor, WaitError, Wake};

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

thread_local! {
    /// Interrupt status of the current thread, created lazily.
    static CURRENT: Interrupter = Interrupter::new();
}

/// A handle to one thread's interrupt flag.
///
/// Obtained with [`current`] on the thread to be interrupted and handed to
/// whoever may need to interrupt it. Cloning is cheap.
#[derive(Clone)]
pub struct Interrupter {
    inner: Arc<Inner>,
}

struct Inner {
    /// The interrupt flag.
    flag: AtomicBool,

    /// What the thread is blocked on right now, if anything.
    blocker: Mutex<Option<Arc<dyn Wake>>>,
}

impl Interrupter {
    fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                flag: AtomicBool::new(false),
                blocker: Mutex::new(None),
            }),
        }
    }

    /// Raises the interrupt flag and wakes the thread if it is blocked.
    pub fn interrupt(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);

        // Clone out of the slot so the wake does not run under its lock.
        let blocker = self.inner.blocker.lock().clone();
        if let Some(blocker) = blocker {
            blocker.wake();
        }
    }

    /// Whether the flag is raised. Does not clear it.
    pub fn is_interrupted(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Clears the flag, returning whether it was raised.
    pub(crate) fn take(&self) -> bool {
        self.inner.flag.swap(false, Ordering::SeqCst)
    }
}

impl fmt::Debug for Interrupter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interrupter")
            .field("interrupted", &self.is_interrupted())
            .finish()
    }
}

/// Returns the interrupt handle of the calling thread.
pub fn current() -> Interrupter {
    CURRENT.with(Interrupter::clone)
}

/// Whether the calling thread has a pending interrupt. Does not clear it.
pub fn is_interrupted() -> bool {
    CURRENT.with(Interrupter::is_interrupted)
}

/// Clears the calling thread's interrupt flag, returning whether it was raised.
pub fn interrupted() -> bool {
    CURRENT.with(Interrupter::take)
}

/// Fails with [`Error::Interrupted`] if the calling thread has a pending
/// interrupt, clearing it.
pub fn check() -> Result<(), Error> {
    if interrupted() {
        Err(Error::Interrupted)
    } else {
        Ok(())
    }
}

/// Sleeps for `duration` unless the calling thread is interrupted first.
///
/// Returns `Err(Error::Interrupted)` as soon as an interrupt arrives, or
/// immediately if one is already pending.
pub fn sleep(duration: Duration) -> Result<(), Error> {
    let monitor = Arc::new(Monitor::new(()));
    let deadline = Instant::now().checked_add(duration);

    match monitor.wait_for(deadline, |_| None::<()>) {
        Err(WaitError::Interrupted) => Err(Error::Interrupted),
        Err(WaitError::TimedOut) | Ok(_) => Ok(()),
    }
}

/// Registration of the current thread as blocked on `blocker`.
///
/// Cleared again on drop.
pub(crate) struct Blocked {
    interrupter: Interrupter,
}

impl Blocked {
    /// Consumes a pending interrupt, if any.
    pub(crate) fn take_interrupt(&self) -> bool {
        self.interrupter.take()
    }
}

impl Drop for Blocked {
    fn drop(&mut self) {
        self.interrupter.inner.blocker.lock().take();
    }
}

/// Marks the calling thread as blocked on `blocker` until the returned
/// guard is dropped.
pub(crate) fn block_on(blocker: Arc<dyn Wake>) -> Blocked {
    let interrupter = current();
    *interrupter.inner.blocker.lock() = Some(blocker);

    Blocked { interrupter }
}

use crate::error::Error;
use crate::interrupt;
use crate::runtime::task::Runnable;
use crate::sync::{Monitor, WaitError};

use std::collections::VecDeque;
use std::sync::Arc;

/// Shared handle to the submission queue.
pub(crate) type QueueHandle = Arc<SubmissionQueue>;

/// An element of the submission queue.
pub(crate) enum Message {
    /// A task to execute.
    Run(Arc<dyn Runnable>),

    /// End of stream: the worker exits when it dequeues this.
    Shutdown,
}

struct Inner {
    /// Messages in submission order.
    items: VecDeque<Message>,

    /// Set once the sentinel has been enqueued; nothing is accepted after it.
    closed: bool,
}

/// Unbounded FIFO between submitters and the worker.
///
/// Submitters never block: [`push`](Self::push) either enqueues or
/// rejects. The worker blocks in [`pop`](Self::pop), which is its only
/// suspension point. Closing the queue and enqueueing the
/// [`Message::Shutdown`] sentinel happen under the same lock as pushes, so
/// a task is either accepted ahead of the sentinel or rejected.
pub(crate) struct SubmissionQueue {
    monitor: Arc<Monitor<Inner>>,
}

impl SubmissionQueue {
    /// Creates a new, open, empty queue.
    pub(crate) fn new() -> Self {
        SubmissionQueue {
            monitor: Arc::new(Monitor::new(Inner {
                items: VecDeque::new(),
                closed: false,
            })),
        }
    }

    /// Enqueues a task.
    ///
    /// # Errors
    ///
    /// [`Error::Rejected`] if the queue has been closed.
    pub(crate) fn push(&self, task: Arc<dyn Runnable>) -> Result<(), Error> {
        self.push_all(vec![task])
    }

    /// Enqueues a batch of tasks atomically, in order.
    ///
    /// Either every task is accepted or, if the queue is closed, none is.
    pub(crate) fn push_all(&self, tasks: Vec<Arc<dyn Runnable>>) -> Result<(), Error> {
        let mut inner = self.monitor.lock();

        if inner.closed {
            return Err(Error::Rejected);
        }

        inner.items.extend(tasks.into_iter().map(Message::Run));
        self.monitor.notify_all();

        Ok(())
    }

    /// Closes the queue and enqueues the sentinel behind the queued tasks.
    ///
    /// Returns `false` if the queue was already closed, in which case
    /// nothing is enqueued.
    pub(crate) fn close(&self) -> bool {
        let mut inner = self.monitor.lock();

        if inner.closed {
            return false;
        }

        inner.closed = true;
        inner.items.push_back(Message::Shutdown);
        self.monitor.notify_all();

        true
    }

    /// Closes the queue and removes every task that has not been dequeued.
    ///
    /// The sentinel stays (or is added) so the worker still terminates. A
    /// sentinel the worker has already consumed is not replaced.
    /// Returns the removed tasks in submission order.
    pub(crate) fn close_and_drain(&self) -> Vec<Arc<dyn Runnable>> {
        let mut inner = self.monitor.lock();

        let mut sentinel = !inner.closed;
        let mut drained = Vec::with_capacity(inner.items.len());

        for message in inner.items.drain(..) {
            match message {
                Message::Run(task) => drained.push(task),
                Message::Shutdown => sentinel = true,
            }
        }

        inner.closed = true;
        if sentinel {
            inner.items.push_back(Message::Shutdown);
        }
        self.monitor.notify_all();

        drained
    }

    /// Whether the queue has been closed.
    pub(crate) fn is_closed(&self) -> bool {
        self.monitor.lock().closed
    }

    /// Number of queued messages, sentinel included.
    pub(crate) fn len(&self) -> usize {
        self.monitor.lock().items.len()
    }

    /// Blocks until a message is available and removes it.
    ///
    /// A pending interrupt aborts the call even if messages are waiting,
    /// consuming the interrupt.
    pub(crate) fn pop(&self) -> Result<Message, WaitError> {
        if interrupt::interrupted() {
            return Err(WaitError::Interrupted);
        }

        self.monitor
            .wait_for(None, |inner| inner.items.pop_front())
    }
}

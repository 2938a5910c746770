use crate::runtime::builder::Callback;
use crate::runtime::queue::{Message, QueueHandle};
use crate::sync::Monitor;

use std::sync::Arc;
use tracing::{debug, trace};

/// The single thread that executes submitted tasks.
///
/// The worker pops messages in FIFO order and runs each task to
/// completion before taking the next one. It exits when it dequeues the
/// shutdown sentinel; an interrupt while idle is swallowed.
pub(crate) struct Worker {
    queue: QueueHandle,

    /// Set to `true` when the worker loop has returned.
    terminated: Arc<Monitor<bool>>,

    on_start: Option<Callback>,
    on_stop: Option<Callback>,
}

/// Marks the worker as terminated on the way out, even if a hook panics.
struct ExitGuard(Arc<Monitor<bool>>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        *self.0.lock() = true;
        self.0.notify_all();
    }
}

impl Worker {
    pub(crate) fn new(
        queue: QueueHandle,
        terminated: Arc<Monitor<bool>>,
        on_start: Option<Callback>,
        on_stop: Option<Callback>,
    ) -> Self {
        Self {
            queue,
            terminated,
            on_start,
            on_stop,
        }
    }

    pub(crate) fn run(self) {
        let _exit = ExitGuard(self.terminated.clone());

        if let Some(hook) = &self.on_start {
            hook();
        }

        debug!("worker started");

        loop {
            match self.queue.pop() {
                Ok(Message::Run(task)) => {
                    trace!(task = %task.id(), "dequeued task");
                    task.run();
                }
                Ok(Message::Shutdown) => break,
                Err(_) => trace!("worker interrupted while idle"),
            }
        }

        if let Some(hook) = &self.on_stop {
            hook();
        }

        debug!("worker stopped");
    }
}

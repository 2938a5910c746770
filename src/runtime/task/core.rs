use super::id::{TaskId, TaskIdGuard};
use super::state::TaskState;
use crate::error::{Error, TaskFailure};
use crate::interrupt::{self, Interrupter};
use crate::sync::{Monitor, WaitError};

use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{trace, warn};

/// The type-erased body of a task.
///
/// Action bodies and fixed-result bodies are adapted to this shape when the
/// task is built, so the worker only ever runs one kind of closure.
pub(crate) type Body<T> = Box<dyn FnOnce() -> Result<T, TaskFailure> + Send + 'static>;

/// A unit of work that the worker can execute.
///
/// The `Runnable` trait abstracts the specific return type of a task,
/// allowing the queue to hold a heterogeneous collection of tasks through
/// `Arc<dyn Runnable>`.
pub(crate) trait Runnable: Send + Sync {
    /// Executes the task on the calling thread.
    fn run(self: Arc<Self>);

    /// Cancels the task. See [`Task::cancel`].
    fn cancel(&self, may_interrupt_running: bool) -> bool;

    fn id(&self) -> TaskId;

    fn state(&self) -> TaskState;
}

/// Lifecycle stage of a task together with the data that belongs to it.
enum Stage<T> {
    /// Waiting in the queue with its body.
    Pending(Body<T>),

    /// Being executed by the thread behind the interrupter.
    Running(Interrupter),

    /// Finished with a value. The value is `None` only after it has been
    /// moved out by [`TaskHandle::join`](super::TaskHandle::join).
    Completed(Option<T>),

    Failed(TaskFailure),

    Cancelled,
}

impl<T> Stage<T> {
    fn state(&self) -> TaskState {
        match self {
            Stage::Pending(_) => TaskState::Pending,
            Stage::Running(_) => TaskState::Running,
            Stage::Completed(_) => TaskState::Completed,
            Stage::Failed(_) => TaskState::Failed,
            Stage::Cancelled => TaskState::Cancelled,
        }
    }
}

/// State guarded by the task's monitor.
struct Slot<T> {
    stage: Stage<T>,

    /// Set while a canceller is delivering an interrupt to the runner.
    ///
    /// The runner does not leave the task until this clears, so the
    /// interrupt cannot land on the next task the worker picks up.
    interrupting: bool,
}

impl<T> Slot<T> {
    /// Copies the outcome out of a finished task, `None` while unfinished.
    fn outcome(&self) -> Option<Result<T, Error>>
    where
        T: Clone,
    {
        match &self.stage {
            Stage::Completed(value) => Some(Ok(value.clone().expect("task result already taken"))),
            Stage::Failed(failure) => Some(Err(Error::Execution(failure.clone()))),
            Stage::Cancelled => Some(Err(Error::Cancelled)),
            Stage::Pending(_) | Stage::Running(_) => None,
        }
    }

    /// Moves the outcome out of a finished task, `None` while unfinished.
    fn take_outcome(&mut self) -> Option<Result<T, Error>> {
        match &mut self.stage {
            Stage::Completed(value) => Some(Ok(value.take().expect("task result already taken"))),
            Stage::Failed(failure) => Some(Err(Error::Execution(failure.clone()))),
            Stage::Cancelled => Some(Err(Error::Cancelled)),
            Stage::Pending(_) | Stage::Running(_) => None,
        }
    }
}

/// A submitted unit of work.
///
/// A `Task` owns the body until it runs, then the result. All transitions
/// happen under the task's monitor, which also wakes the handles waiting
/// for it.
pub(crate) struct Task<T> {
    id: TaskId,
    slot: Arc<Monitor<Slot<T>>>,
}

impl<T: Send + 'static> Task<T> {
    /// Creates a pending task around `body`.
    pub(crate) fn new(body: Body<T>) -> Self {
        Self {
            id: TaskId::next(),
            slot: Arc::new(Monitor::new(Slot {
                stage: Stage::Pending(body),
                interrupting: false,
            })),
        }
    }

    pub(crate) fn id(&self) -> TaskId {
        self.id
    }

    pub(crate) fn state(&self) -> TaskState {
        self.slot.lock().stage.state()
    }

    /// Executes the body if the task is still pending.
    ///
    /// The body runs without any lock held. Panics are caught and recorded
    /// as failures; nothing escapes to the caller. If the task was
    /// cancelled while running, the outcome is discarded.
    pub(crate) fn run(&self) {
        let body = {
            let mut slot = self.slot.lock();
            match mem::replace(&mut slot.stage, Stage::Running(interrupt::current())) {
                Stage::Pending(body) => body,
                other => {
                    // Cancelled while queued; waiters were released then.
                    slot.stage = other;
                    return;
                }
            }
        };

        trace!(task = %self.id, "running task");

        let outcome = {
            let _id = TaskIdGuard::enter(self.id);
            panic::catch_unwind(AssertUnwindSafe(body))
                .unwrap_or_else(|payload| Err(TaskFailure::from_panic(payload)))
        };

        let mut slot = self.slot.lock();

        while slot.interrupting {
            self.slot.wait(&mut slot);
        }

        if !matches!(slot.stage, Stage::Running(_)) {
            trace!(task = %self.id, "task cancelled while running, outcome discarded");
            return;
        }

        slot.stage = match outcome {
            Ok(value) => {
                trace!(task = %self.id, "task completed");
                Stage::Completed(Some(value))
            }
            Err(failure) => {
                if failure.is_panic() {
                    warn!(task = %self.id, %failure, "task body panicked");
                } else {
                    trace!(task = %self.id, %failure, "task failed");
                }
                Stage::Failed(failure)
            }
        };

        self.slot.notify_all();
    }

    /// Attempts to cancel the task.
    ///
    /// A pending task is cancelled and will never run. A running task is
    /// marked cancelled and, if `may_interrupt_running` is set, its runner
    /// is interrupted; the body itself keeps running until it notices.
    /// Waiters are released immediately in both cases.
    ///
    /// Returns `false` without changing anything if the task has already
    /// finished.
    pub(crate) fn cancel(&self, may_interrupt_running: bool) -> bool {
        let mut slot = self.slot.lock();

        let runner = match &slot.stage {
            Stage::Pending(_) => None,
            Stage::Running(runner) => Some(runner.clone()),
            Stage::Completed(_) | Stage::Failed(_) | Stage::Cancelled => return false,
        };

        let previous = mem::replace(&mut slot.stage, Stage::Cancelled);
        self.slot.notify_all();

        let Some(runner) = runner.filter(|_| may_interrupt_running) else {
            drop(slot);
            // Drops the unrun body, if any, outside the lock.
            drop(previous);
            return true;
        };

        slot.interrupting = true;
        drop(slot);

        runner.interrupt();

        let mut slot = self.slot.lock();
        slot.interrupting = false;
        self.slot.notify_all();

        true
    }

    /// Blocks until the task is finished or the deadline passes.
    pub(crate) fn wait(&self, deadline: Option<Instant>) -> Result<(), WaitError> {
        self.slot
            .wait_for(deadline, |slot| slot.stage.state().is_terminal().then_some(()))
    }

    /// Blocks until the task is finished, then copies its outcome.
    pub(crate) fn get(&self, deadline: Option<Instant>) -> Result<Result<T, Error>, WaitError>
    where
        T: Clone,
    {
        self.slot.wait_for(deadline, |slot| slot.outcome())
    }

    /// Blocks until the task is finished, then moves its outcome out.
    pub(crate) fn take(&self, deadline: Option<Instant>) -> Result<Result<T, Error>, WaitError> {
        self.slot.wait_for(deadline, |slot| slot.take_outcome())
    }
}

impl<T: Send + 'static> Runnable for Task<T> {
    fn run(self: Arc<Self>) {
        Task::run(&self)
    }

    fn cancel(&self, may_interrupt_running: bool) -> bool {
        Task::cancel(self, may_interrupt_running)
    }

    fn id(&self) -> TaskId {
        self.id
    }

    fn state(&self) -> TaskState {
        Task::state(self)
    }
}

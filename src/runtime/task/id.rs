use std::cell::Cell;
use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

thread_local! {
    /// Id of the task whose body is executing on this thread.
    static CURRENT_TASK: Cell<Option<TaskId>> = const { Cell::new(None) };
}

/// An opaque ID that uniquely identifies a submitted task.
///
/// Ids are allocated from a process-wide counter, so they are unique across
/// every executor in the process and increase in submission order.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct TaskId(NonZeroU64);

impl TaskId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);

        let id = COUNTER.fetch_add(1, Ordering::Relaxed);

        let Some(id) = NonZeroU64::new(id) else {
            Self::exhausted();
        };

        Self(id)
    }

    #[cold]
    fn exhausted() -> ! {
        panic!("failed to generate unique task ID: bitspace exhausted")
    }

    /// Returns the raw numeric value of the id.
    pub fn as_u64(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Returns the id of the task currently running on this thread, or `None`
/// when called outside of a task body.
pub fn try_id() -> Option<TaskId> {
    CURRENT_TASK.with(Cell::get)
}

/// Installs `id` as the current task until the guard is dropped.
pub(super) struct TaskIdGuard {
    parent: Option<TaskId>,
}

impl TaskIdGuard {
    pub(super) fn enter(id: TaskId) -> Self {
        let parent = CURRENT_TASK.with(|cell| cell.replace(Some(id)));
        Self { parent }
    }
}

impl Drop for TaskIdGuard {
    fn drop(&mut self) {
        CURRENT_TASK.with(|cell| cell.set(self.parent));
    }
}

/// Observable lifecycle state of a task.
///
/// ```text
/// Pending ──► Running ──► Completed
///    │           │    └──► Failed
///    └───────────┴──────► Cancelled
/// ```
///
/// `Completed`, `Failed` and `Cancelled` are terminal: once a task reaches
/// one of them its state never changes again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Queued, not yet picked up by the worker.
    Pending,

    /// The worker is executing the body.
    ///
    /// At most one thread ever observes a given task in this state as its
    /// runner.
    Running,

    /// The body returned a value.
    Completed,

    /// The body returned an error or panicked.
    Failed,

    /// The task was cancelled before producing a result.
    Cancelled,
}

impl TaskState {
    /// Whether no further transition can happen from this state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Cancelled
        )
    }
}

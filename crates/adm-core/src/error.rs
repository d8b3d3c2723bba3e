//! Errors surfaced by the task engine to its callers.
//!
//! Per-URL fetch and pack failures never appear here: the builder records them
//! as text on the task and carries on.

use thiserror::Error;

use crate::task::{TaskId, TaskStatus};

#[derive(Debug, Error)]
pub enum TaskError {
    /// Every admission slot is held; the caller may retry later.
    #[error("server is busy")]
    Busy,

    #[error("task {0} not found")]
    NotFound(TaskId),

    /// URLs were submitted after the task left `created`.
    #[error("task {id} is {status}, urls can only be added while created")]
    InvalidState { id: TaskId, status: TaskStatus },

    /// The artifact was requested before the task reached `done`.
    #[error("task {id} is {status}, archive not available")]
    NotReady { id: TaskId, status: TaskStatus },

    #[error("entropy unavailable for task id: {0}")]
    EntropyUnavailable(#[source] rand::Error),
}

//! Errors raised by the task model and store.

use crate::id::TaskId;

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur when building or updating tasks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Title was empty or whitespace
    #[error("task title must not be empty")]
    EmptyTitle,

    /// Duration below the one-minute minimum
    #[error("task duration must be at least 1 minute, got {0}")]
    InvalidDuration(u32),

    /// No task with this id
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Replacement value carries a different id than the slot it targets
    #[error("replacement for {expected} carries id {actual}")]
    IdMismatch {
        /// Id of the slot being replaced
        expected: TaskId,
        /// Id found on the replacement
        actual: TaskId,
    },

    /// Unparseable task id
    #[error("invalid task id: {0:?} (expected task-N or N)")]
    InvalidTaskId(String),
}

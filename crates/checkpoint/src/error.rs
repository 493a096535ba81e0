//! Scheduler errors.

use glance_core::CoreError;

use crate::scheduler::SchedulerState;

/// Result alias for scheduler and session operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors raised when driving checkpoint schedules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// The action is not valid from the scheduler's current state
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        /// Requested action
        action: &'static str,
        /// State the scheduler was in
        state: SchedulerState,
    },

    /// An answer arrived with no prompt shown
    #[error("no checkpoint prompt is active")]
    NoActivePrompt,

    /// Task model or store error
    #[error(transparent)]
    Core(#[from] CoreError),
}

//! The single, process-wide checkpoint prompt.

use serde::Serialize;

use glance_core::TaskId;

/// A question asking whether a checkpoint's subtask was completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    /// Task the prompt belongs to
    pub task_id: TaskId,
    /// Zero-based checkpoint index
    pub checkpoint: usize,
    /// Name of the subtask being asked about
    pub subtask: String,
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Did you complete {}?", self.subtask)
    }
}

/// The user's reply to a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    /// The checkpoint was completed
    Yes,
    /// Not yet
    No,
}

/// Holds the one prompt visible at a time, across all tasks.
#[derive(Debug, Default)]
pub struct PromptSlot {
    active: Option<Prompt>,
}

impl PromptSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `prompt`, returning whichever prompt it replaced.
    pub fn show(&mut self, prompt: Prompt) -> Option<Prompt> {
        self.active.replace(prompt)
    }

    /// Remove and return the active prompt.
    pub fn take(&mut self) -> Option<Prompt> {
        self.active.take()
    }

    /// Dismiss the active prompt if it belongs to `task_id`.
    pub fn dismiss_for(&mut self, task_id: &TaskId) -> Option<Prompt> {
        if self.active.as_ref().is_some_and(|p| &p.task_id == task_id) {
            self.active.take()
        } else {
            None
        }
    }

    /// The prompt currently shown.
    pub fn active(&self) -> Option<&Prompt> {
        self.active.as_ref()
    }
}

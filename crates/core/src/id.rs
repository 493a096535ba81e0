//! Identifiers for Glance entities.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Unique identifier for a Task, of the form `task-N`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// Build the id for the `seq`-th task (1-based).
    pub fn sequential(seq: usize) -> Self {
        Self(format!("task-{seq}"))
    }

    /// Borrow the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = CoreError;

    /// Accepts `task-N` or a bare `N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("task-").unwrap_or(trimmed);
        match digits.parse::<usize>() {
            Ok(seq) if seq > 0 => Ok(Self::sequential(seq)),
            _ => Err(CoreError::InvalidTaskId(s.to_string())),
        }
    }
}

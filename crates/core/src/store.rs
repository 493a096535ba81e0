//! In-memory ordered task store.

use crate::error::{CoreError, Result};
use crate::id::TaskId;
use crate::task::Task;

/// Ordered collection of tasks, updated by whole-value replacement.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a task and append it, assigning the next sequential id.
    pub fn add_task(&mut self, title: impl Into<String>, duration_minutes: u32) -> Result<&Task> {
        let id = TaskId::sequential(self.tasks.len() + 1);
        let task = Task::new(id, title, duration_minutes)?;
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Swap in `updated` for the task with `id`, keeping its position.
    pub fn replace_task(&mut self, id: &TaskId, updated: Task) -> Result<()> {
        if &updated.id != id {
            return Err(CoreError::IdMismatch {
                expected: id.clone(),
                actual: updated.id,
            });
        }
        let slot = self
            .tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| CoreError::TaskNotFound(id.clone()))?;
        *slot = updated;
        Ok(())
    }

    /// Look up a task by id.
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Tasks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the store holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

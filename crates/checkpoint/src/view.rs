//! Render model for a task and its schedule.

use serde::Serialize;

use glance_core::{Task, TaskId};

use crate::scheduler::{CheckpointScheduler, SchedulerState};

/// Everything the presentation layer shows for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    /// Task id
    pub id: TaskId,
    /// Task title
    pub title: String,
    /// Percent complete
    pub progress: u8,
    /// Scheduler state
    pub state: SchedulerState,
    /// Next checkpoint to confirm
    pub current_checkpoint: usize,
    /// Seconds counted while running
    pub elapsed_secs: u64,
    /// Estimated seconds left
    pub estimated_remaining_secs: u64,
    /// Completion flag per checkpoint
    pub checkpoints: Vec<bool>,
}

impl TaskView {
    /// Combine a task with its scheduler's counters.
    pub fn new(task: &Task, scheduler: &CheckpointScheduler) -> Self {
        let snapshot = scheduler.snapshot();
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            progress: task.progress,
            state: snapshot.state,
            current_checkpoint: snapshot.current_checkpoint,
            elapsed_secs: snapshot.elapsed_secs,
            estimated_remaining_secs: snapshot.estimated_remaining_secs,
            checkpoints: task.subtasks.iter().map(|s| s.completed).collect(),
        }
    }
}

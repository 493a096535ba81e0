//! Task model - a timed unit of work split into equal checkpoints.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::id::TaskId;
use crate::Time;

/// Number of checkpoints every task is divided into.
pub const CHECKPOINT_COUNT: usize = 4;

/// A task with a fixed duration and four checkpoint subtasks.
///
/// Values are treated as immutable snapshots: updates produce a new
/// `Task` (see [`Task::with_confirmed_through`] and [`Task::with_reset`])
/// which the store swaps in wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// Total duration in minutes
    duration_minutes: u32,

    /// Seconds per checkpoint, fixed at creation
    interval_secs: u64,

    /// One subtask per checkpoint
    pub subtasks: [Subtask; CHECKPOINT_COUNT],

    /// Percent complete (0-100)
    pub progress: u8,

    /// Creation timestamp
    pub created_at: Time,
}

/// The unit of work tied to one checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    /// Display name, `Checkpoint N`
    pub name: String,

    /// Duration in seconds, equal to the parent interval
    pub duration_secs: u64,

    /// Whether the user confirmed this checkpoint
    pub completed: bool,
}

impl Task {
    /// Create a task, deriving its interval and subtasks from `duration_minutes`.
    pub fn new(id: TaskId, title: impl Into<String>, duration_minutes: u32) -> Result<Self> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(CoreError::EmptyTitle);
        }
        if duration_minutes < 1 {
            return Err(CoreError::InvalidDuration(duration_minutes));
        }

        let interval_secs = u64::from(duration_minutes) * 60 / CHECKPOINT_COUNT as u64;
        let subtasks = std::array::from_fn(|i| Subtask {
            name: format!("Checkpoint {}", i + 1),
            duration_secs: interval_secs,
            completed: false,
        });

        Ok(Self {
            id,
            title,
            duration_minutes,
            interval_secs,
            subtasks,
            progress: 0,
            created_at: chrono::Utc::now(),
        })
    }

    /// Total duration in seconds.
    pub fn duration_secs(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }

    /// Seconds per checkpoint.
    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    /// Number of subtasks marked completed.
    pub fn completed_count(&self) -> usize {
        self.subtasks.iter().filter(|s| s.completed).count()
    }

    /// A copy with subtasks `0..=index` completed and the rest not.
    ///
    /// Progress becomes `25%` per completed checkpoint. An `index` past
    /// the last checkpoint completes every subtask.
    pub fn with_confirmed_through(&self, index: usize) -> Self {
        let mut next = self.clone();
        for (i, subtask) in next.subtasks.iter_mut().enumerate() {
            subtask.completed = i <= index;
        }
        next.progress = progress_for(next.completed_count());
        next
    }

    /// A copy with every subtask incomplete and progress back at zero.
    pub fn with_reset(&self) -> Self {
        let mut next = self.clone();
        for subtask in next.subtasks.iter_mut() {
            subtask.completed = false;
        }
        next.progress = 0;
        next
    }
}

fn progress_for(completed: usize) -> u8 {
    (completed.min(CHECKPOINT_COUNT) * 100 / CHECKPOINT_COUNT) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(minutes: u32) -> Task {
        Task::new(TaskId::sequential(1), "Write report", minutes).unwrap()
    }

    #[test]
    fn test_interval_is_quarter_of_duration() {
        for minutes in [1, 2, 3, 4, 7, 25, 90] {
            let t = task(minutes);
            let expected = u64::from(minutes) * 60 / 4;
            assert_eq!(t.interval_secs(), expected);
            assert_eq!(t.duration_secs(), u64::from(minutes) * 60);
            assert!(t.subtasks.iter().all(|s| s.duration_secs == expected));
        }
    }

    #[test]
    fn test_subtasks_named_and_incomplete() {
        let t = task(4);
        let names: Vec<_> = t.subtasks.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Checkpoint 1", "Checkpoint 2", "Checkpoint 3", "Checkpoint 4"]);
        assert_eq!(t.completed_count(), 0);
        assert_eq!(t.progress, 0);
    }

    #[test]
    fn test_rejects_empty_title_and_zero_duration() {
        assert_eq!(
            Task::new(TaskId::sequential(1), "   ", 5).unwrap_err(),
            CoreError::EmptyTitle
        );
        assert_eq!(
            Task::new(TaskId::sequential(1), "x", 0).unwrap_err(),
            CoreError::InvalidDuration(0)
        );
    }

    #[test]
    fn test_title_is_trimmed() {
        let t = Task::new(TaskId::sequential(1), "  Read docs ", 1).unwrap();
        assert_eq!(t.title, "Read docs");
    }

    #[test]
    fn test_confirmed_through_marks_prefix() {
        let base = task(4);
        for k in 0..CHECKPOINT_COUNT {
            let t = base.with_confirmed_through(k);
            for (i, s) in t.subtasks.iter().enumerate() {
                assert_eq!(s.completed, i <= k, "checkpoint {k}, subtask {i}");
            }
            assert_eq!(t.progress as usize, (k + 1) * 25);
        }
        // base value is untouched
        assert_eq!(base.completed_count(), 0);
    }

    #[test]
    fn test_serializes_fixed_subtask_array() {
        let json = serde_json::to_value(task(4)).unwrap();
        assert_eq!(json["id"], "task-1");
        assert_eq!(json["interval_secs"], 60);
        assert_eq!(json["subtasks"].as_array().unwrap().len(), 4);
        assert_eq!(json["subtasks"][3]["name"], "Checkpoint 4");
    }

    #[test]
    fn test_reset_clears_flags_and_progress() {
        let done = task(2).with_confirmed_through(3);
        assert_eq!(done.progress, 100);

        let reset = done.with_reset();
        assert_eq!(reset.completed_count(), 0);
        assert_eq!(reset.progress, 0);
        assert_eq!(reset.interval_secs(), done.interval_secs());
    }
}

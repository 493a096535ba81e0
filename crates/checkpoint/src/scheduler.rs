//! Per-task checkpoint scheduling.
//!
//! A scheduler waits one interval, asks whether the current checkpoint
//! was reached, and advances on confirmation. Timers run as spawned
//! tokio tasks that only post [`SchedulerEvent`]s; every state change
//! happens when the owner feeds those events back in.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use glance_core::{Task, TaskId, CHECKPOINT_COUNT};

use crate::config::{SchedulerConfig, MAX_WAIT};
use crate::error::{Result, SchedulerError};
use crate::prompt::Prompt;
use crate::timer::{Generation, TimerSlot};

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// Not started, or fully reset
    Idle,
    /// Checkpoint timer armed, elapsed time ticking
    Running,
    /// Timer fired; waiting on the user's answer
    AwaitingConfirmation,
    /// Timers suspended, position retained
    Paused,
    /// All checkpoints confirmed
    Completed,
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerState::Idle => write!(f, "idle"),
            SchedulerState::Running => write!(f, "running"),
            SchedulerState::AwaitingConfirmation => write!(f, "awaiting confirmation"),
            SchedulerState::Paused => write!(f, "paused"),
            SchedulerState::Completed => write!(f, "completed"),
        }
    }
}

/// Events posted by a scheduler's timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// The checkpoint timer elapsed
    CheckpointDue {
        /// Owning task
        task_id: TaskId,
        /// Arm that produced the event
        generation: Generation,
    },
    /// One scheduled second passed
    Tick {
        /// Owning task
        task_id: TaskId,
        /// Arm that produced the event
        generation: Generation,
    },
}

/// Point-in-time view of a scheduler's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchedulerSnapshot {
    /// Lifecycle state
    pub state: SchedulerState,
    /// Index of the next checkpoint to confirm (4 when done)
    pub current_checkpoint: usize,
    /// Seconds counted while running
    pub elapsed_secs: u64,
    /// Estimated seconds left
    pub estimated_remaining_secs: u64,
}

/// Drives the checkpoint prompts of a single task.
#[derive(Debug)]
pub struct CheckpointScheduler {
    task_id: TaskId,
    interval_secs: u64,
    duration_secs: u64,
    state: SchedulerState,
    current_checkpoint: usize,
    elapsed_secs: u64,
    estimated_remaining_secs: u64,
    checkpoint_timer: TimerSlot,
    ticker: TimerSlot,
    events: mpsc::UnboundedSender<SchedulerEvent>,
    config: SchedulerConfig,
}

impl CheckpointScheduler {
    /// Create an idle scheduler for `task`, posting timer events to `events`.
    pub fn new(
        task: &Task,
        events: mpsc::UnboundedSender<SchedulerEvent>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            task_id: task.id.clone(),
            interval_secs: task.interval_secs(),
            duration_secs: task.duration_secs(),
            state: SchedulerState::Idle,
            current_checkpoint: 0,
            elapsed_secs: 0,
            estimated_remaining_secs: task.duration_secs(),
            checkpoint_timer: TimerSlot::new(),
            ticker: TimerSlot::new(),
            events,
            config,
        }
    }

    /// Begin or resume: arms a full interval for the current checkpoint.
    pub fn start(&mut self) -> Result<()> {
        self.require("start", &[SchedulerState::Idle, SchedulerState::Paused])?;

        if self.current_checkpoint == 0 {
            self.estimated_remaining_secs = self.duration_secs;
        }
        self.state = SchedulerState::Running;
        self.arm_checkpoint(self.interval_secs);
        self.start_ticker();

        info!(
            task = %self.task_id,
            checkpoint = self.current_checkpoint,
            "Task started"
        );
        Ok(())
    }

    /// Suspend both timers, keeping checkpoint and elapsed time.
    pub fn pause(&mut self) -> Result<()> {
        self.require(
            "pause",
            &[SchedulerState::Running, SchedulerState::AwaitingConfirmation],
        )?;

        self.cancel_timers();
        self.state = SchedulerState::Paused;

        info!(
            task = %self.task_id,
            checkpoint = self.current_checkpoint,
            elapsed = self.elapsed_secs,
            "Task paused"
        );
        Ok(())
    }

    /// Full stop: cancel timers, zero the counters, and return `task` with
    /// every subtask cleared.
    pub fn reset(&mut self, task: &Task) -> Task {
        self.cancel_timers();
        self.state = SchedulerState::Idle;
        self.current_checkpoint = 0;
        self.elapsed_secs = 0;
        self.estimated_remaining_secs = self.duration_secs;

        info!(task = %self.task_id, "Task reset");
        task.with_reset()
    }

    /// Handle the checkpoint timer firing. Yields a prompt about the
    /// current checkpoint, or `None` if the event is stale.
    pub fn on_checkpoint_due(&mut self, task: &Task, generation: Generation) -> Option<Prompt> {
        if !self.checkpoint_timer.take_fired(generation) {
            debug!(task = %self.task_id, generation, "Ignoring stale checkpoint event");
            return None;
        }
        if self.state != SchedulerState::Running {
            return None;
        }

        let subtask = task.subtasks.get(self.current_checkpoint)?;
        self.state = SchedulerState::AwaitingConfirmation;

        debug!(task = %self.task_id, checkpoint = self.current_checkpoint, "Checkpoint due");
        Some(Prompt {
            task_id: self.task_id.clone(),
            checkpoint: self.current_checkpoint,
            subtask: subtask.name.clone(),
        })
    }

    /// Count one elapsed second. Returns whether the tick was accepted.
    pub fn on_tick(&mut self, generation: Generation) -> bool {
        let counting = matches!(
            self.state,
            SchedulerState::Running | SchedulerState::AwaitingConfirmation
        );
        if !counting || !self.ticker.is_current(generation) {
            return false;
        }
        self.elapsed_secs += 1;
        true
    }

    /// "Yes": mark subtasks through the current checkpoint complete and
    /// move on. Returns the updated task for the store.
    pub fn confirm(&mut self, task: &Task) -> Result<Task> {
        self.require("confirm", &[SchedulerState::AwaitingConfirmation])?;

        let updated = task.with_confirmed_through(self.current_checkpoint);
        self.current_checkpoint += 1;
        let remaining = CHECKPOINT_COUNT.saturating_sub(self.current_checkpoint) as u64;
        self.estimated_remaining_secs = self.interval_secs * remaining;

        if self.current_checkpoint < CHECKPOINT_COUNT {
            self.state = SchedulerState::Running;
            self.arm_checkpoint(self.interval_secs);
            info!(
                task = %self.task_id,
                next = self.current_checkpoint,
                "Checkpoint confirmed"
            );
        } else {
            self.cancel_timers();
            self.state = SchedulerState::Completed;
            info!(task = %self.task_id, elapsed = self.elapsed_secs, "All checkpoints confirmed");
        }

        Ok(updated)
    }

    /// "No": leave progress alone and ask about the same checkpoint
    /// again after the retry delay.
    pub fn decline(&mut self) -> Result<()> {
        self.require("decline", &[SchedulerState::AwaitingConfirmation])?;

        let delay = self.config.retry_after_secs().unwrap_or(self.interval_secs);
        self.state = SchedulerState::Running;
        self.arm_checkpoint(delay);

        info!(
            task = %self.task_id,
            checkpoint = self.current_checkpoint,
            retry_in = delay,
            "Checkpoint declined"
        );
        Ok(())
    }

    /// Lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Index of the next checkpoint to confirm.
    pub fn current_checkpoint(&self) -> usize {
        self.current_checkpoint
    }

    /// Seconds counted while running.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Estimated seconds left.
    pub fn estimated_remaining_secs(&self) -> u64 {
        self.estimated_remaining_secs
    }

    /// Whether a checkpoint timer is pending.
    pub fn has_pending_checkpoint(&self) -> bool {
        self.checkpoint_timer.is_armed()
    }

    /// Copy out the counters.
    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            state: self.state,
            current_checkpoint: self.current_checkpoint,
            elapsed_secs: self.elapsed_secs,
            estimated_remaining_secs: self.estimated_remaining_secs,
        }
    }

    fn require(&self, action: &'static str, allowed: &[SchedulerState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SchedulerError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    fn arm_checkpoint(&mut self, after_secs: u64) {
        let deadline = deadline_after(self.config.scaled(after_secs));
        let events = self.events.clone();
        let task_id = self.task_id.clone();

        let generation = self.checkpoint_timer.arm(move |generation| async move {
            tokio::time::sleep_until(deadline).await;
            let _ = events.send(SchedulerEvent::CheckpointDue { task_id, generation });
        });
        debug!(task = %self.task_id, generation, after_secs, "Checkpoint timer armed");
    }

    fn start_ticker(&mut self) {
        let period = self.config.second();
        let first = deadline_after(period);
        let events = self.events.clone();
        let task_id = self.task_id.clone();

        self.ticker.arm(move |generation| async move {
            let mut interval = tokio::time::interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let event = SchedulerEvent::Tick {
                    task_id: task_id.clone(),
                    generation,
                };
                if events.send(event).is_err() {
                    break;
                }
            }
        });
    }

    fn cancel_timers(&mut self) {
        self.checkpoint_timer.cancel();
        self.ticker.cancel();
    }
}

/// `now + wait`, falling back to the longest wait when that overflows.
fn deadline_after(wait: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(wait)
        .or_else(|| now.checked_add(MAX_WAIT))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(minutes: u32) -> (Task, CheckpointScheduler, mpsc::UnboundedReceiver<SchedulerEvent>) {
        let task = Task::new(TaskId::sequential(1), "Write report", minutes).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = CheckpointScheduler::new(&task, tx, SchedulerConfig::default());
        (task, scheduler, rx)
    }

    /// Feed events back until a checkpoint prompt comes out.
    async fn next_prompt(
        task: &Task,
        scheduler: &mut CheckpointScheduler,
        rx: &mut mpsc::UnboundedReceiver<SchedulerEvent>,
    ) -> Prompt {
        loop {
            match rx.recv().await.expect("sender alive") {
                SchedulerEvent::CheckpointDue { generation, .. } => {
                    if let Some(prompt) = scheduler.on_checkpoint_due(task, generation) {
                        return prompt;
                    }
                }
                SchedulerEvent::Tick { generation, .. } => {
                    scheduler.on_tick(generation);
                }
            }
        }
    }

    #[test]
    fn test_new_is_idle() {
        let (_, scheduler, _rx) = setup(4);
        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.state, SchedulerState::Idle);
        assert_eq!(snapshot.current_checkpoint, 0);
        assert_eq!(snapshot.elapsed_secs, 0);
        assert_eq!(snapshot.estimated_remaining_secs, 240);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_start_sets_full_estimate() {
        let (_, mut scheduler, _rx) = setup(6);
        scheduler.start().unwrap();

        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert_eq!(scheduler.estimated_remaining_secs(), 360);
        assert!(scheduler.has_pending_checkpoint());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_prompt_after_one_interval() {
        let (task, mut scheduler, mut rx) = setup(4);
        let started = Instant::now();
        scheduler.start().unwrap();

        let prompt = next_prompt(&task, &mut scheduler, &mut rx).await;

        assert_eq!(started.elapsed(), Duration::from_secs(60));
        assert_eq!(prompt.checkpoint, 0);
        assert_eq!(prompt.subtask, "Checkpoint 1");
        assert_eq!(scheduler.state(), SchedulerState::AwaitingConfirmation);
        assert!(!scheduler.has_pending_checkpoint());
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_marks_prefix_and_updates_estimate() {
        let (mut task, mut scheduler, mut rx) = setup(4);
        scheduler.start().unwrap();

        for k in 0..3 {
            next_prompt(&task, &mut scheduler, &mut rx).await;
            task = scheduler.confirm(&task).unwrap();

            for (i, subtask) in task.subtasks.iter().enumerate() {
                assert_eq!(subtask.completed, i <= k);
            }
            assert_eq!(scheduler.current_checkpoint(), k + 1);
            assert_eq!(scheduler.estimated_remaining_secs(), 60 * (3 - k as u64));
            assert_eq!(scheduler.state(), SchedulerState::Running);
            assert!(scheduler.has_pending_checkpoint());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fourth_confirm_completes_without_rearming() {
        let (mut task, mut scheduler, mut rx) = setup(1);
        scheduler.start().unwrap();

        for _ in 0..CHECKPOINT_COUNT {
            next_prompt(&task, &mut scheduler, &mut rx).await;
            task = scheduler.confirm(&task).unwrap();
        }

        assert_eq!(scheduler.current_checkpoint(), 4);
        assert_eq!(scheduler.state(), SchedulerState::Completed);
        assert_eq!(scheduler.estimated_remaining_secs(), 0);
        assert!(!scheduler.has_pending_checkpoint());
        assert_eq!(task.completed_count(), 4);
        assert_eq!(task.progress, 100);

        let err = scheduler.start().unwrap_err();
        assert_eq!(
            err,
            SchedulerError::InvalidTransition {
                action: "start",
                state: SchedulerState::Completed
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_events_ignored_after_pause() {
        let (task, mut scheduler, _rx) = setup(4);
        scheduler.start().unwrap();
        scheduler.pause().unwrap();

        // first arm of each slot carries generation 1
        assert!(scheduler.on_checkpoint_due(&task, 1).is_none());
        assert!(!scheduler.on_tick(1));
        assert_eq!(scheduler.state(), SchedulerState::Paused);
        assert_eq!(scheduler.elapsed_secs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_after_never_overflows() {
        let now = Instant::now();
        let far = deadline_after(Duration::MAX);
        assert!(far >= now);
        assert!(far <= now + MAX_WAIT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_with_slowest_second_arms_without_panic() {
        let task = Task::new(TaskId::sequential(1), "Long haul", u32::MAX).unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = SchedulerConfig::new().with_second(Duration::from_millis(u64::MAX));
        let mut scheduler = CheckpointScheduler::new(&task, tx, config);

        scheduler.start().unwrap();
        assert!(scheduler.has_pending_checkpoint());

        scheduler.pause().unwrap();
        scheduler.start().unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_transitions() {
        let (task, mut scheduler, _rx) = setup(4);

        assert!(matches!(
            scheduler.pause(),
            Err(SchedulerError::InvalidTransition { action: "pause", .. })
        ));
        assert!(scheduler.confirm(&task).is_err());
        assert!(scheduler.decline().is_err());

        scheduler.start().unwrap();
        assert!(matches!(
            scheduler.start(),
            Err(SchedulerError::InvalidTransition {
                state: SchedulerState::Running,
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_restores_initial_counters() {
        let (task, mut scheduler, mut rx) = setup(2);
        scheduler.start().unwrap();
        next_prompt(&task, &mut scheduler, &mut rx).await;
        let confirmed = scheduler.confirm(&task).unwrap();

        let reset = scheduler.reset(&confirmed);

        assert_eq!(scheduler.snapshot(), SchedulerSnapshot {
            state: SchedulerState::Idle,
            current_checkpoint: 0,
            elapsed_secs: 0,
            estimated_remaining_secs: 120,
        });
        assert_eq!(reset.completed_count(), 0);
        assert!(!scheduler.has_pending_checkpoint());
    }
}

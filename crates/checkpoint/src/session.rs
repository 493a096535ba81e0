//! The session: task store, schedulers and the shared prompt slot.
//!
//! All mutation funnels through one `Session` value. Timer tasks only
//! post events into its channel; the caller awaits [`Session::next_event`]
//! and hands each event to [`Session::handle_event`], so state changes
//! happen one at a time on a single owner.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use glance_core::{CoreError, Task, TaskId, TaskStore};

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::prompt::{Prompt, PromptAnswer, PromptSlot};
use crate::scheduler::{CheckpointScheduler, SchedulerEvent};
use crate::view::TaskView;

/// Owns every task and its scheduler.
#[derive(Debug)]
pub struct Session {
    store: TaskStore,
    schedulers: HashMap<TaskId, CheckpointScheduler>,
    prompt: PromptSlot,
    config: SchedulerConfig,
    events_tx: mpsc::UnboundedSender<SchedulerEvent>,
    events_rx: mpsc::UnboundedReceiver<SchedulerEvent>,
}

impl Session {
    /// Create an empty session.
    pub fn new(config: SchedulerConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            store: TaskStore::new(),
            schedulers: HashMap::new(),
            prompt: PromptSlot::new(),
            config,
            events_tx,
            events_rx,
        }
    }

    /// Create a task with an idle scheduler.
    pub fn add_task(&mut self, title: impl Into<String>, duration_minutes: u32) -> Result<TaskId> {
        let task = self.store.add_task(title, duration_minutes)?;
        let scheduler = CheckpointScheduler::new(task, self.events_tx.clone(), self.config);

        info!(
            task = %task.id,
            title = %task.title,
            minutes = duration_minutes,
            interval = task.interval_secs(),
            "Task added"
        );
        let id = task.id.clone();
        self.schedulers.insert(id.clone(), scheduler);
        Ok(id)
    }

    /// Start or resume a task.
    pub fn start(&mut self, id: &TaskId) -> Result<()> {
        self.scheduler_mut(id)?.start()
    }

    /// Pause a task; its prompt, if showing, is dismissed.
    pub fn pause(&mut self, id: &TaskId) -> Result<()> {
        self.scheduler_mut(id)?.pause()?;
        if self.prompt.dismiss_for(id).is_some() {
            debug!(task = %id, "Prompt dismissed by pause");
        }
        Ok(())
    }

    /// Fully stop a task, clearing its checkpoints.
    pub fn reset(&mut self, id: &TaskId) -> Result<()> {
        let task = self.task_or_err(id)?.clone();
        let updated = self.scheduler_mut(id)?.reset(&task);
        self.store.replace_task(id, updated)?;
        self.prompt.dismiss_for(id);
        Ok(())
    }

    /// Answer the active prompt. Returns the prompt that was answered.
    pub fn answer(&mut self, answer: PromptAnswer) -> Result<Prompt> {
        let prompt = self.prompt.take().ok_or(SchedulerError::NoActivePrompt)?;
        let id = prompt.task_id.clone();

        match answer {
            PromptAnswer::Yes => {
                let task = self.task_or_err(&id)?.clone();
                let updated = self.scheduler_mut(&id)?.confirm(&task)?;
                self.store.replace_task(&id, updated)?;
            }
            PromptAnswer::No => self.scheduler_mut(&id)?.decline()?,
        }
        Ok(prompt)
    }

    /// Wait for the next timer event.
    pub async fn next_event(&mut self) -> Option<SchedulerEvent> {
        self.events_rx.recv().await
    }

    /// Apply a timer event. Returns a prompt if one was just shown.
    pub fn handle_event(&mut self, event: SchedulerEvent) -> Option<Prompt> {
        match event {
            SchedulerEvent::Tick { task_id, generation } => {
                if let Some(scheduler) = self.schedulers.get_mut(&task_id) {
                    scheduler.on_tick(generation);
                }
                None
            }
            SchedulerEvent::CheckpointDue { task_id, generation } => {
                let task = self.store.get(&task_id)?;
                let scheduler = self.schedulers.get_mut(&task_id)?;
                let prompt = scheduler.on_checkpoint_due(task, generation)?;

                if let Some(displaced) = self.prompt.show(prompt.clone()) {
                    self.displace(displaced, &prompt);
                }
                Some(prompt)
            }
        }
    }

    /// The prompt currently shown.
    pub fn active_prompt(&self) -> Option<&Prompt> {
        self.prompt.active()
    }

    /// Look up a task.
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.store.get(id)
    }

    /// Look up a task's scheduler.
    pub fn scheduler(&self, id: &TaskId) -> Option<&CheckpointScheduler> {
        self.schedulers.get(id)
    }

    /// Render model for one task.
    pub fn view(&self, id: &TaskId) -> Option<TaskView> {
        let task = self.store.get(id)?;
        let scheduler = self.schedulers.get(id)?;
        Some(TaskView::new(task, scheduler))
    }

    /// Render models for all tasks, in creation order.
    pub fn views(&self) -> Vec<TaskView> {
        self.store
            .iter()
            .filter_map(|task| self.view(&task.id))
            .collect()
    }

    /// A prompt pushed out by another task's prompt counts as a "no".
    fn displace(&mut self, displaced: Prompt, by: &Prompt) {
        if displaced.task_id == by.task_id {
            return;
        }
        warn!(
            task = %displaced.task_id,
            by = %by.task_id,
            "Prompt replaced before it was answered"
        );
        if let Some(scheduler) = self.schedulers.get_mut(&displaced.task_id) {
            if let Err(e) = scheduler.decline() {
                debug!(task = %displaced.task_id, error = %e, "Displaced task not awaiting");
            }
        }
    }

    fn task_or_err(&self, id: &TaskId) -> Result<&Task> {
        self.store
            .get(id)
            .ok_or_else(|| CoreError::TaskNotFound(id.clone()).into())
    }

    fn scheduler_mut(&mut self, id: &TaskId) -> Result<&mut CheckpointScheduler> {
        self.schedulers
            .get_mut(id)
            .ok_or_else(|| CoreError::TaskNotFound(id.clone()).into())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

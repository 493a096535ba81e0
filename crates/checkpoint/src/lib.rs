//! Checkpoint scheduling.
//!
//! Per-task checkpoint timers, the shared prompt slot, and the session
//! that owns them.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod prompt;
pub mod scheduler;
pub mod session;
pub mod timer;
pub mod view;

pub use config::SchedulerConfig;
pub use error::{Result, SchedulerError};
pub use prompt::{Prompt, PromptAnswer, PromptSlot};
pub use scheduler::{CheckpointScheduler, SchedulerEvent, SchedulerSnapshot, SchedulerState};
pub use session::Session;
pub use timer::{Generation, TimerSlot};
pub use view::TaskView;

//! Glance core data models.
//!
//! Tasks split into four equal checkpoints, and the ordered in-memory
//! store that holds them.

#![warn(missing_docs)]

mod error;
mod id;
mod store;
mod task;
mod time;

pub use error::{CoreError, Result};
pub use id::TaskId;
pub use store::TaskStore;
pub use task::{Subtask, Task, CHECKPOINT_COUNT};
pub use time::format_clock;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;

//! Text rendering for the shell.

use glance_checkpoint::{Prompt, TaskView};
use glance_core::format_clock;

const DONE: char = '●';
const OPEN: char = '○';

/// Multi-line summary of one task.
pub fn task(view: &TaskView) -> String {
    let dots: String = view
        .checkpoints
        .iter()
        .map(|&done| if done { DONE } else { OPEN })
        .collect();

    format!(
        "[{}] {} - {}% Complete ({})\n  Elapsed Time: {}\n  Estimated Time Remaining: {}\n  {}",
        view.id,
        view.title,
        view.progress,
        view.state,
        format_clock(view.elapsed_secs),
        format_clock(view.estimated_remaining_secs),
        dots,
    )
}

/// All tasks, or a placeholder when there are none.
pub fn task_list(views: &[TaskView]) -> String {
    if views.is_empty() {
        return "No tasks yet. Try: add 25 Write the report".to_string();
    }
    views.iter().map(task).collect::<Vec<_>>().join("\n")
}

/// A checkpoint question with its answer hint.
pub fn prompt(prompt: &Prompt) -> String {
    format!("[{}] {} (yes/no)", prompt.task_id, prompt)
}

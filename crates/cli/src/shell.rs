//! Line-oriented command shell.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use glance_checkpoint::{PromptAnswer, Session};
use glance_core::TaskId;

use crate::render;

/// One line typed at the prompt.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
enum ShellCommand {
    /// Add a task split into four checkpoints
    Add {
        /// Duration in minutes
        minutes: u32,
        /// Task title
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        title: Vec<String>,
    },
    /// Start or resume a task
    Start {
        /// Task id (task-N or N)
        id: TaskId,
    },
    /// Pause a running task
    Pause {
        /// Task id (task-N or N)
        id: TaskId,
    },
    /// Stop a task and clear its checkpoints
    Reset {
        /// Task id (task-N or N)
        id: TaskId,
    },
    /// Confirm the active checkpoint
    #[command(alias = "y")]
    Yes,
    /// Leave the active checkpoint open for now
    #[command(alias = "n")]
    No,
    /// Show all tasks
    #[command(alias = "ls")]
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// What the main loop should do after a line.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Print this text
    Output(String),
    /// Nothing to print
    Nothing,
    /// Leave the loop
    Quit,
}

/// Parse and run one line against the session.
///
/// Syntax errors and help requests come back as `Output` so the shell
/// keeps running; session errors are returned as `Err`.
pub fn execute(session: &mut Session, line: &str) -> Result<Outcome> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(Outcome::Nothing);
    }

    let command = match ShellLine::try_parse_from(words) {
        Ok(parsed) => parsed.command,
        Err(e) => return Ok(Outcome::Output(e.to_string().trim_end().to_string())),
    };
    debug!(?command, "Shell command");

    let outcome = match command {
        ShellCommand::Add { minutes, title } => {
            let id = session.add_task(title.join(" "), minutes)?;
            Outcome::Output(format!("Added {id}\n{}", describe(session, &id)))
        }
        ShellCommand::Start { id } => {
            session.start(&id)?;
            Outcome::Output(format!("Started {id}"))
        }
        ShellCommand::Pause { id } => {
            session.pause(&id)?;
            Outcome::Output(format!("Paused {id}"))
        }
        ShellCommand::Reset { id } => {
            session.reset(&id)?;
            Outcome::Output(format!("Reset {id}"))
        }
        ShellCommand::Yes => {
            let prompt = session.answer(PromptAnswer::Yes)?;
            Outcome::Output(format!(
                "Confirmed {}\n{}",
                prompt.subtask,
                describe(session, &prompt.task_id)
            ))
        }
        ShellCommand::No => {
            let prompt = session.answer(PromptAnswer::No)?;
            Outcome::Output(format!(
                "{} left open for {}; you'll be asked again later",
                prompt.subtask, prompt.task_id
            ))
        }
        ShellCommand::List { json } => {
            let views = session.views();
            if json {
                Outcome::Output(serde_json::to_string_pretty(&views)?)
            } else {
                Outcome::Output(render::task_list(&views))
            }
        }
        ShellCommand::Quit => Outcome::Quit,
    };
    Ok(outcome)
}

fn describe(session: &Session, id: &TaskId) -> String {
    session
        .view(id)
        .map(|view| render::task(&view))
        .unwrap_or_default()
}

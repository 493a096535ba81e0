//! Glance CLI - checkpointed task timer.

mod render;
mod shell;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use glance_checkpoint::{SchedulerConfig, Session};
use shell::Outcome;

#[derive(Parser)]
#[command(name = "glance")]
#[command(about = "Track timed tasks through four checkpoints", long_about = None)]
struct Cli {
    /// Seconds to wait before asking again after "no" (default: one checkpoint interval)
    #[arg(long)]
    retry_after_secs: Option<u64>,

    /// Wall-clock milliseconds per scheduled second (lower to speed up demos)
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..=60_000))]
    second_millis: u64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Task to add at startup, as MINUTES:TITLE (repeatable)
    #[arg(long = "task", value_parser = parse_task_arg)]
    tasks: Vec<(u32, String)>,
}

impl Cli {
    fn scheduler_config(&self) -> SchedulerConfig {
        let config =
            SchedulerConfig::new().with_second(Duration::from_millis(self.second_millis));
        match self.retry_after_secs {
            Some(secs) => config.with_retry_after_secs(secs),
            None => config,
        }
    }
}

fn parse_task_arg(raw: &str) -> std::result::Result<(u32, String), String> {
    let (minutes, title) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected MINUTES:TITLE, got {raw:?}"))?;
    let minutes = minutes
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid minutes {minutes:?}: {e}"))?;
    Ok((minutes, title.trim().to_string()))
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let mut session = Session::new(cli.scheduler_config());
    for (minutes, title) in &cli.tasks {
        session.add_task(title.as_str(), *minutes)?;
    }

    println!("Glance - type `help` for commands");
    if !cli.tasks.is_empty() {
        println!("{}", render::task_list(&session.views()));
    }
    info!(tasks = cli.tasks.len(), "Shell ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match shell::execute(&mut session, &line) {
                    Ok(Outcome::Output(text)) => println!("{text}"),
                    Ok(Outcome::Nothing) => {}
                    Ok(Outcome::Quit) => break,
                    Err(e) => println!("error: {e}"),
                }
            }
            Some(event) = session.next_event() => {
                if let Some(prompt) = session.handle_event(event) {
                    println!("{}", render::prompt(&prompt));
                }
            }
        }
    }

    info!("Shell closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_arg() {
        assert_eq!(parse_task_arg("25:Write report"), Ok((25, "Write report".to_string())));
        assert_eq!(parse_task_arg(" 4 : a:b "), Ok((4, "a:b".to_string())));
        assert!(parse_task_arg("no-colon").is_err());
        assert!(parse_task_arg("x:title").is_err());
    }

    #[test]
    fn test_cli_builds_config() {
        let cli = Cli::parse_from([
            "glance",
            "--second-millis",
            "250",
            "--retry-after-secs",
            "30",
            "--task",
            "4:Write report",
        ]);
        let config = cli.scheduler_config();
        assert_eq!(config.second(), Duration::from_millis(250));
        assert_eq!(config.retry_after_secs(), Some(30));
        assert_eq!(cli.tasks, vec![(4, "Write report".to_string())]);
    }

    #[test]
    fn test_cli_rejects_second_out_of_range() {
        assert!(Cli::try_parse_from(["glance", "--second-millis", "0"]).is_err());
        assert!(Cli::try_parse_from(["glance", "--second-millis", "60001"]).is_err());
        assert!(Cli::try_parse_from(["glance", "--second-millis", "18446744073709551615"]).is_err());
        assert!(Cli::try_parse_from(["glance", "--second-millis", "60000"]).is_ok());
    }
}

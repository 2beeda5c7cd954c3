//! Tracing setup
//!
//! The TUI owns the terminal, so interactive sessions log to a daily file
//! under the user's data directory. Headless commands log to stderr.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "CHATTERM_LOG";

/// Filter from `CHATTERM_LOG`, then the configured level, then `info`
fn env_filter(configured: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return filter;
    }
    match configured.map(str::parse::<EnvFilter>) {
        Some(Ok(filter)) => filter,
        Some(Err(e)) => {
            eprintln!(
                "WARN: log level '{}' is not a valid tracing filter ({}); falling back to 'info'",
                configured.unwrap_or_default(),
                e
            );
            EnvFilter::new("info")
        }
        None => EnvFilter::new("info"),
    }
}

pub fn log_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?;
    Ok(data_dir.join("chatterm").join("logs"))
}

/// Log to a daily rolling file. Keep the guard alive until exit so buffered
/// lines are flushed.
pub fn init_file(configured: Option<&str>) -> Result<WorkerGuard> {
    let dir = log_dir()?;
    std::fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::daily(&dir, "chatterm.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(guard)
}

pub fn init_stderr(configured: Option<&str>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))
}

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Where log lines may go without disturbing the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Only log when a file is given (the TUI owns the terminal).
    FileOnly,
    /// Fall back to stderr when no file is given.
    FileOrStderr,
}

pub fn init_tracing(level: &str, log_file: Option<&Path>, target: LogTarget) -> Result<()> {
    let env_filter =
        EnvFilter::try_new(level).map_err(|e| anyhow!("invalid log level '{}': {}", level, e))?;

    let init_result = match (log_file, target) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("could not open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .try_init()
        }
        (None, LogTarget::FileOrStderr) => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(true)
            .try_init(),
        (None, LogTarget::FileOnly) => return Ok(()),
    };

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tasklist_core::Filter;

#[derive(Parser, Debug)]
#[command(name = "tasklist")]
#[command(about = "An in-memory task list for the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Filter selected at startup
    #[arg(long, value_enum, default_value_t = FilterArg::All, global = true)]
    pub filter: FilterArg,

    /// Log level or filter directive (e.g. "debug", "tasklist_core=trace")
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Write logs to this file. The TUI only logs when this is set.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// TUI input poll interval in milliseconds
    #[arg(long, default_value_t = 250, global = true)]
    pub tick_rate: u64,
}

#[derive(clap::Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Open the Terminal User Interface (default)
    Tui,
    /// Read commands line by line from stdin
    Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterArg {
    All,
    Active,
    Completed,
}

impl From<FilterArg> for Filter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => Filter::All,
            FilterArg::Active => Filter::Active,
            FilterArg::Completed => Filter::Completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub command: Commands,
    pub filter: Filter,
    pub tick_rate: Duration,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        Self {
            command: cli.command.unwrap_or(Commands::Tui),
            filter: cli.filter.into(),
            // A zero poll interval would spin the event loop.
            tick_rate: Duration::from_millis(cli.tick_rate.max(10)),
            log_level: cli.log_level,
            log_file: cli.log_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> AppConfig {
        Cli::try_parse_from(args).unwrap().into()
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&["tasklist"]);
        assert_eq!(cfg.command, Commands::Tui);
        assert_eq!(cfg.filter, Filter::All);
        assert_eq!(cfg.tick_rate, Duration::from_millis(250));
        assert_eq!(cfg.log_level, "warn");
        assert_eq!(cfg.log_file, None);
    }

    #[test]
    fn test_shell_with_options() {
        let cfg = config(&[
            "tasklist",
            "shell",
            "--filter",
            "active",
            "--log-level",
            "debug",
            "--tick-rate",
            "0",
        ]);
        assert_eq!(cfg.command, Commands::Shell);
        assert_eq!(cfg.filter, Filter::Active);
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.tick_rate, Duration::from_millis(10));
    }

    #[test]
    fn test_rejects_unknown_filter() {
        assert!(Cli::try_parse_from(["tasklist", "--filter", "done"]).is_err());
    }
}

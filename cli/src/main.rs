mod config;
mod logging;
mod shell;
mod tui;

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::Parser;

use crate::config::{AppConfig, Cli, Commands};
use crate::logging::{init_tracing, LogTarget};
use crate::shell::Shell;

fn main() -> Result<()> {
    let config = AppConfig::from(Cli::parse());

    match config.command {
        Commands::Tui => {
            init_tracing(&config.log_level, config.log_file.as_deref(), LogTarget::FileOnly)?;
            tui::run(&config)?;
        }
        Commands::Shell => {
            init_tracing(&config.log_level, config.log_file.as_deref(), LogTarget::FileOrStderr)?;
            let stdin = io::stdin();
            let prompt = stdin.is_terminal();
            let mut stdout = io::stdout();
            Shell::new(config.filter).run(stdin.lock(), &mut stdout, prompt)?;
        }
    }
    Ok(())
}

//! # Sifter Entry Point
//!
//! ```text
//! main()
//!   │
//!   ├─> Parse CLI arguments (clap)
//!   ├─> Load configuration (file + SIFTER_* overrides)
//!   ├─> Initialise logging (stderr + rolling files)
//!   ├─> Create Tokio runtime
//!   └─> Run the subcommand against a fresh session
//! ```
//!
//! Results are printed to stdout as JSON; logs go to stderr and the log
//! directory, so stdout stays machine-readable in `serve` mode.

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // CLI results are printed as JSON

mod cli;

use anyhow::{Context as _, Result};
use clap::Parser as _;
use sifter::commands::AppState;
use sifter::config::AppConfig;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let mut config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    sifter::logging::init(&config.logging)?;

    let state = AppState::new(config);
    tokio::runtime::Runtime::new()
        .context("Failed to start Tokio runtime")?
        .block_on(cli::run_command(cli.command, state))
}

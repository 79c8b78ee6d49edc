//! Game patcher CLI
//!
//! Overlays per-game patch files onto an install directory, with
//! checksum-tracked backups so everything can be cleanly reverted later.

mod cli;
mod commands;
mod config;
mod error;
mod interactive;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Apply { game, conflicts } => {
            commands::run_apply(&cli.config_dir, &game, conflicts)
        }
        Commands::Revert { game } => commands::run_revert(&cli.config_dir, &game),
        Commands::Status { game } => commands::run_status(&cli.config_dir, &game),
    }
}

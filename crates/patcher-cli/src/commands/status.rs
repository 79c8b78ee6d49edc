//! Status command implementation

use std::path::Path;

use colored::Colorize;
use patcher_core::{FileStatus, status};

use crate::config;
use crate::error::Result;

/// Run the status command
pub fn run_status(config_dir: &Path, game: &str) -> Result<()> {
    let entry = config::load_game(config_dir, game)?;

    let report = status(&entry)?;
    if report.is_empty() {
        println!("No patches applied");
        return Ok(());
    }

    println!();
    println!("{} {}", "Patched files for".bold(), game.cyan());
    println!();

    let mut clean = 0;
    let mut modified = 0;
    let mut missing = 0;
    for (path, file_status) in &report {
        let label = match file_status {
            FileStatus::Clean => {
                clean += 1;
                "clean   ".green()
            }
            FileStatus::Modified => {
                modified += 1;
                "MODIFIED".yellow()
            }
            FileStatus::Missing => {
                missing += 1;
                "MISSING ".red()
            }
        };
        println!("  [{label}] {path}");
    }

    println!();
    println!("Summary: {clean} clean, {modified} modified, {missing} missing");
    Ok(())
}

//! Revert command implementation

use std::path::Path;

use colored::Colorize;
use patcher_core::revert;

use crate::config;
use crate::error::Result;

/// Run the revert command
pub fn run_revert(config_dir: &Path, game: &str) -> Result<()> {
    let entry = config::load_game(config_dir, game)?;

    let report = revert(&entry)?;
    if report.is_empty() {
        println!("No patches applied");
        return Ok(());
    }

    for path in &report.restored {
        println!("  {} {}", "restored".green(), path);
    }
    for path in &report.removed {
        println!("  {} {}", "removed ".yellow(), path);
    }

    println!();
    println!("Reverted {} file(s)", report.len());
    Ok(())
}

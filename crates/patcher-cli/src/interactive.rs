//! Interactive conflict prompt
//!
//! Used only when no `--conflicts` flag was given and stdin is a terminal;
//! the engine itself never prompts. A failed or aborted prompt resolves to
//! `Abort`, the safe choice.

use colored::Colorize;
use dialoguer::Select;
use patcher_core::{ConflictInfo, ConflictPolicy};

const CHOICES: &[&str] = &[
    "Abort (leave this file untouched)",
    "Re-backup (use the current file as the new baseline)",
    "Force overwrite (discard the changes)",
];

/// Ask the user how to settle one conflicted file.
pub fn prompt_conflict(info: &ConflictInfo<'_>) -> ConflictPolicy {
    println!();
    println!(
        "{} {}",
        "Conflict detected for".yellow().bold(),
        info.relative_path.cyan()
    );
    println!("  {} {}", "expected".dimmed(), info.expected_checksum);
    println!("  {} {}", "found   ".dimmed(), info.current_checksum);
    println!("  {} {}", "incoming".dimmed(), info.new_patch_checksum);

    let choice = Select::new()
        .with_prompt("Resolution")
        .items(CHOICES)
        .default(0)
        .interact()
        .unwrap_or(0);

    match choice {
        1 => ConflictPolicy::RebaseBackup,
        2 => ConflictPolicy::Force,
        _ => ConflictPolicy::Abort,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_is_the_first_and_default_choice() {
        assert!(CHOICES[0].starts_with("Abort"));
    }
}

//! Apply command implementation

use std::io::IsTerminal;
use std::path::Path;

use colored::Colorize;
use patcher_core::{ApplyOutcome, ConflictPolicy, PatchSet, apply};

use crate::cli::ConflictsArg;
use crate::config;
use crate::error::Result;
use crate::interactive;

/// Run the apply command
pub fn run_apply(config_dir: &Path, game: &str, conflicts: Option<ConflictsArg>) -> Result<()> {
    let entry = config::load_game(config_dir, game)?;
    let patches_dir = config::patches_dir(config_dir, game);

    if !patches_dir.is_dir() {
        return Err(crate::error::CliError::user(format!(
            "Patches directory not found: {}",
            patches_dir.display()
        )));
    }

    let patch_set = PatchSet::load(&patches_dir)?;
    if patch_set.is_empty() {
        println!("No patch files found in {}", patches_dir.display());
        return Ok(());
    }

    let report = match conflicts {
        Some(arg) => {
            let policy: ConflictPolicy = arg.into();
            apply(&entry, &patch_set, |_| policy)?
        }
        None if std::io::stdin().is_terminal() => {
            apply(&entry, &patch_set, interactive::prompt_conflict)?
        }
        // Non-interactive with no policy given: never guess, skip conflicts.
        None => apply(&entry, &patch_set, |_| ConflictPolicy::Abort)?,
    };

    for (path, outcome) in &report.outcomes {
        match outcome {
            ApplyOutcome::Applied => println!("  {} {}", "patched  ".green(), path),
            ApplyOutcome::Unchanged => println!("  {} {}", "unchanged".dimmed(), path),
            ApplyOutcome::SkippedConflict => println!("  {} {}", "skipped  ".yellow(), path),
        }
    }

    println!();
    println!(
        "Applied {} file(s), {} unchanged, {} skipped",
        report.applied(),
        report.unchanged(),
        report.skipped()
    );
    if report.skipped() > 0 {
        println!(
            "{} rerun with {} to settle skipped conflicts",
            "hint:".yellow(),
            "--conflicts force|rebase".cyan()
        );
    }
    Ok(())
}

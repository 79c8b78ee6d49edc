//! Revert: restore originals and clear tracking state
//!
//! Each tracked record either restores the backed-up original (verified
//! against its recorded checksum first) or deletes the file the patch
//! introduced. Tracking state is only dropped after every restoration
//! succeeded, so a failed run never claims files are reverted when they
//! are not, and never discards backups it still needs.

use std::fs;
use walkdir::WalkDir;

use patcher_fs::io::{remove_if_present, write_file};
use patcher_fs::{GameLock, compute_checksum};

use crate::game::GameEntry;
use crate::state::{FileTrackingRecord, GameState};
use crate::{Error, LOCK_TIMEOUT, Result};

/// What revert did, per relative path.
#[derive(Debug, Default)]
pub struct RevertReport {
    /// Paths restored from their backup copies.
    pub restored: Vec<String>,
    /// Paths deleted because no file existed before patching.
    pub removed: Vec<String>,
}

impl RevertReport {
    pub fn is_empty(&self) -> bool {
        self.restored.is_empty() && self.removed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.restored.len() + self.removed.len()
    }
}

/// Restore a game to its pre-patch content and clear its tracking state.
///
/// # Errors
///
/// A backup whose checksum no longer matches its record (or a missing
/// backup file) aborts the run with state and remaining backups intact.
pub fn revert(entry: &GameEntry) -> Result<RevertReport> {
    let lock = GameLock::acquire(&entry.lock_path(), LOCK_TIMEOUT)?;
    let state = GameState::load(&entry.state_path())?;

    let mut report = RevertReport::default();
    for (relative, record) in state.files() {
        restore_one(entry, relative, record, &mut report)?;
    }

    // Every restoration succeeded; only now is it safe to drop tracking
    // and the backup copies.
    GameState::delete(&entry.state_path())?;
    for (relative, record) in state.files() {
        if record.existed_before_patch {
            remove_if_present(&entry.backup_file(relative))?;
        }
    }
    prune_empty_dirs(entry);

    lock.release()?;
    Ok(report)
}

fn restore_one(
    entry: &GameEntry,
    relative: &str,
    record: &FileTrackingRecord,
    report: &mut RevertReport,
) -> Result<()> {
    let target_path = entry.target_file(relative);

    if !record.existed_before_patch {
        // The patch introduced this file; absence is not an error.
        remove_if_present(&target_path)?;
        tracing::debug!(path = %relative, "removed introduced file");
        report.removed.push(relative.to_string());
        return Ok(());
    }

    let backup_path = entry.backup_file(relative);
    let bytes = match fs::read(&backup_path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::BackupMissing {
                path: relative.to_string(),
            });
        }
        Err(e) => return Err(Error::io(&backup_path, e)),
    };

    let expected = record.original_checksum.as_deref().ok_or_else(|| {
        Error::StateCorrupt {
            path: entry.state_path(),
            message: format!("record for {relative} has a backup but no original checksum"),
        }
    })?;
    let actual = compute_checksum(&bytes);
    if actual != expected {
        return Err(Error::RestoreInconsistency {
            path: relative.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }

    write_file(&target_path, &bytes)?;
    tracing::debug!(path = %relative, "restored original");
    report.restored.push(relative.to_string());
    Ok(())
}

/// Remove directories under the backup root that emptied out once the
/// backup copies were deleted. Best effort; a directory that still has
/// content simply stays.
fn prune_empty_dirs(entry: &GameEntry) {
    for dir_entry in WalkDir::new(&entry.backup)
        .contents_first(true)
        .into_iter()
        .flatten()
    {
        if dir_entry.depth() == 0 || !dir_entry.file_type().is_dir() {
            continue;
        }
        // remove_dir refuses non-empty directories, which is the filter.
        if fs::remove_dir(dir_entry.path()).is_ok() {
            tracing::debug!(path = %dir_entry.path().display(), "pruned empty backup directory");
        }
    }
}

//! Patch application with all-or-nothing rollback
//!
//! Files are processed in sorted relative-path order for reproducibility.
//! Before any path is mutated its pre-apply bytes (target and backup) are
//! journaled in memory; if anything fails mid-run the journal is replayed
//! in reverse, the in-memory state changes are discarded, and the persisted
//! document is left exactly as it was.

use std::fs;
use std::path::{Path, PathBuf};

use patcher_fs::io::{read_optional, remove_if_present, write_file};
use patcher_fs::{GameLock, compute_checksum};

use crate::conflict::{self, ConflictOutcome, ConflictPolicy, FileStatus};
use crate::game::GameEntry;
use crate::patchset::{PatchFile, PatchSet};
use crate::state::{FileTrackingRecord, GameState};
use crate::{Error, LOCK_TIMEOUT, Result};

/// Per-file result of an apply run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Patch content was written to the target.
    Applied,
    /// Target already holds this patch; nothing to do.
    Unchanged,
    /// The file had drifted and the caller chose not to resolve it.
    SkippedConflict,
}

/// What apply did, per relative path in processing order.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub outcomes: Vec<(String, ApplyOutcome)>,
}

impl ApplyReport {
    pub fn applied(&self) -> usize {
        self.count(ApplyOutcome::Applied)
    }

    pub fn unchanged(&self) -> usize {
        self.count(ApplyOutcome::Unchanged)
    }

    pub fn skipped(&self) -> usize {
        self.count(ApplyOutcome::SkippedConflict)
    }

    fn count(&self, outcome: ApplyOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }
}

/// Context handed to the conflict decision callback.
#[derive(Debug)]
pub struct ConflictInfo<'a> {
    /// Relative path of the drifted file.
    pub relative_path: &'a str,
    /// Checksum the target was expected to hold.
    pub expected_checksum: &'a str,
    /// Checksum the target actually holds.
    pub current_checksum: &'a str,
    /// Checksum of the incoming patch content.
    pub new_patch_checksum: &'a str,
}

/// Pre-apply snapshot of one absolute path touched this run.
struct Snapshot {
    path: PathBuf,
    before: Option<Vec<u8>>,
}

/// Apply a patch set to a game's target directory.
///
/// `decide` is consulted once per drifted file; the engine itself never
/// prompts. The whole run is atomic: on any I/O failure every file touched
/// so far is restored to its pre-apply bytes and state is not persisted.
///
/// # Errors
///
/// Fails fast with lock contention, corrupt state, or a missing target
/// directory; I/O failures mid-run surface after rollback completes.
pub fn apply(
    entry: &GameEntry,
    patch_set: &PatchSet,
    mut decide: impl FnMut(&ConflictInfo<'_>) -> ConflictPolicy,
) -> Result<ApplyReport> {
    if !entry.target.is_dir() {
        return Err(Error::TargetMissing {
            path: entry.target.clone(),
        });
    }

    let lock = GameLock::acquire(&entry.lock_path(), LOCK_TIMEOUT)?;
    let mut state = GameState::load(&entry.state_path())?;

    let mut journal: Vec<Snapshot> = Vec::new();
    let mut report = ApplyReport::default();

    for (relative, patch) in patch_set.files() {
        match apply_one(entry, relative, patch, &mut decide, &mut state, &mut journal) {
            Ok(outcome) => {
                tracing::debug!(path = %relative, ?outcome, "processed patch entry");
                report.outcomes.push((relative.clone(), outcome));
            }
            Err(e) => {
                tracing::warn!(path = %relative, error = %e, "apply failed, rolling back");
                rollback(&journal);
                return Err(e);
            }
        }
    }

    if let Err(e) = state.save(&entry.state_path()) {
        tracing::warn!(error = %e, "state save failed, rolling back");
        rollback(&journal);
        return Err(e);
    }

    lock.release()?;
    Ok(report)
}

fn apply_one(
    entry: &GameEntry,
    relative: &str,
    patch: &PatchFile,
    decide: &mut impl FnMut(&ConflictInfo<'_>) -> ConflictPolicy,
    state: &mut GameState,
    journal: &mut Vec<Snapshot>,
) -> Result<ApplyOutcome> {
    let target_path = entry.target_file(relative);
    let current = read_optional(&target_path)?;

    let Some(record) = state.get(relative).cloned() else {
        first_time_patch(entry, relative, patch, current, state, journal)?;
        return Ok(ApplyOutcome::Applied);
    };

    let Some(current_bytes) = current else {
        // The target vanished since the last apply (external deletion or a
        // partial revert). Re-establish the path as a first-time patch; a
        // leftover backup no longer describes anything the new record
        // references, so it goes too.
        if record.existed_before_patch {
            let backup_path = entry.backup_file(relative);
            snapshot(journal, &backup_path)?;
            remove_if_present(&backup_path)?;
        }
        first_time_patch(entry, relative, patch, None, state, journal)?;
        return Ok(ApplyOutcome::Applied);
    };

    let current_checksum = compute_checksum(&current_bytes);
    if conflict::classify(&record, Some(&current_checksum)) == FileStatus::Clean {
        if record.patch_checksum == patch.checksum {
            return Ok(ApplyOutcome::Unchanged);
        }
        // Target still holds exactly what we last wrote; safe to overwrite
        // in place, the existing backup stays authoritative.
        snapshot(journal, &target_path)?;
        write_file(&target_path, &patch.content)?;
        let mut record = record;
        record.patch_checksum = patch.checksum.clone();
        record.applied_checksum = patch.checksum.clone();
        state.insert(relative.to_string(), record);
        return Ok(ApplyOutcome::Applied);
    }

    // Modified: the caller decides how the drift is settled.
    let info = ConflictInfo {
        relative_path: relative,
        expected_checksum: &record.applied_checksum,
        current_checksum: &current_checksum,
        new_patch_checksum: &patch.checksum,
    };
    let policy = decide(&info);
    tracing::debug!(path = %relative, ?policy, "conflict decision");

    match conflict::resolve(&current_checksum, &patch.checksum, policy) {
        ConflictOutcome::Unresolved => Ok(ApplyOutcome::SkippedConflict),
        ConflictOutcome::Overwrite { applied_checksum } => {
            snapshot(journal, &target_path)?;
            write_file(&target_path, &patch.content)?;
            let mut record = record;
            record.patch_checksum = patch.checksum.clone();
            record.applied_checksum = applied_checksum;
            state.insert(relative.to_string(), record);
            Ok(ApplyOutcome::Applied)
        }
        ConflictOutcome::Rebase {
            original_checksum,
            applied_checksum,
        } => {
            let backup_path = entry.backup_file(relative);
            snapshot(journal, &backup_path)?;
            write_file(&backup_path, &current_bytes)?;
            snapshot(journal, &target_path)?;
            write_file(&target_path, &patch.content)?;
            state.insert(
                relative.to_string(),
                FileTrackingRecord {
                    patch_checksum: patch.checksum.clone(),
                    applied_checksum,
                    existed_before_patch: true,
                    original_checksum: Some(original_checksum),
                },
            );
            Ok(ApplyOutcome::Applied)
        }
    }
}

/// First-time patching of a path is never a conflict: an existing target
/// is backed up unconditionally before the patch content lands.
fn first_time_patch(
    entry: &GameEntry,
    relative: &str,
    patch: &PatchFile,
    current: Option<Vec<u8>>,
    state: &mut GameState,
    journal: &mut Vec<Snapshot>,
) -> Result<()> {
    let target_path = entry.target_file(relative);

    let record = match current {
        Some(original_bytes) => {
            let backup_path = entry.backup_file(relative);
            snapshot(journal, &backup_path)?;
            write_file(&backup_path, &original_bytes)?;
            FileTrackingRecord {
                patch_checksum: patch.checksum.clone(),
                applied_checksum: patch.checksum.clone(),
                existed_before_patch: true,
                original_checksum: Some(compute_checksum(&original_bytes)),
            }
        }
        None => FileTrackingRecord {
            patch_checksum: patch.checksum.clone(),
            applied_checksum: patch.checksum.clone(),
            existed_before_patch: false,
            original_checksum: None,
        },
    };

    snapshot(journal, &target_path)?;
    write_file(&target_path, &patch.content)?;
    state.insert(relative.to_string(), record);
    Ok(())
}

/// Record the current bytes of `path` before it is mutated this run.
fn snapshot(journal: &mut Vec<Snapshot>, path: &Path) -> Result<()> {
    let before = read_optional(path)?;
    journal.push(Snapshot {
        path: path.to_path_buf(),
        before,
    });
    Ok(())
}

/// Restore every journaled path to its pre-apply bytes, newest first.
/// Best effort: a path that cannot be restored is logged, the rest are
/// still attempted.
fn rollback(journal: &[Snapshot]) {
    for snap in journal.iter().rev() {
        let result = match &snap.before {
            Some(bytes) => fs::write(&snap.path, bytes),
            None => match fs::remove_file(&snap.path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
        };
        if let Err(e) = result {
            tracing::error!(path = %snap.path.display(), error = %e, "rollback failed");
        }
    }
}

//! Conflict classification and resolution
//!
//! Pure decision logic; no I/O happens here. The status reporter only
//! classifies, the applier additionally turns a caller-supplied policy
//! into an outcome it then executes. Keeping the decision a plain value
//! means the engine never prompts anybody: the CLI (or a test) decides.

use crate::state::FileTrackingRecord;
use serde::Serialize;

/// Reconciliation status of one tracked file against the live target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Target holds exactly what the patcher last wrote.
    Clean,
    /// Target exists but drifted from the applied checksum.
    Modified,
    /// Target file is gone.
    Missing,
}

/// How the caller wants apply-time conflicts settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Leave the file untouched and report it as unresolved.
    Abort,
    /// Overwrite the drifted content with the new patch.
    Force,
    /// Adopt the drifted content as the new backup baseline, then patch.
    RebaseBackup,
}

/// What the applier must do for a conflicted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictOutcome {
    /// Target and record stay untouched; the file is reported as skipped.
    Unresolved,
    /// Overwrite the target with the new patch content and advance
    /// `applied_checksum`; the existing backup stays authoritative.
    Overwrite { applied_checksum: String },
    /// Overwrite the backup with the current target content (new
    /// `original_checksum`), then overwrite the target with the patch.
    Rebase {
        original_checksum: String,
        applied_checksum: String,
    },
}

/// Classify a tracked file against the target's current checksum.
pub fn classify(record: &FileTrackingRecord, current_checksum: Option<&str>) -> FileStatus {
    match current_checksum {
        None => FileStatus::Missing,
        Some(current) if current == record.applied_checksum => FileStatus::Clean,
        Some(_) => FileStatus::Modified,
    }
}

/// Decide the outcome of a `Modified` file at apply time.
///
/// Only called for files that already have a tracking record and whose
/// target drifted from `applied_checksum`.
pub fn resolve(
    current_checksum: &str,
    new_patch_checksum: &str,
    policy: ConflictPolicy,
) -> ConflictOutcome {
    match policy {
        ConflictPolicy::Abort => ConflictOutcome::Unresolved,
        ConflictPolicy::Force => ConflictOutcome::Overwrite {
            applied_checksum: new_patch_checksum.to_string(),
        },
        ConflictPolicy::RebaseBackup => ConflictOutcome::Rebase {
            original_checksum: current_checksum.to_string(),
            applied_checksum: new_patch_checksum.to_string(),
        },
    }
}

//! Read-only drift report
//!
//! Classifies every tracked file against the live target. Takes the
//! per-game lock so it never reads state mid-write by a concurrent apply
//! or revert, but performs no writes of its own.

use std::collections::BTreeMap;

use patcher_fs::io::read_optional;
use patcher_fs::{GameLock, compute_checksum};

use crate::conflict::{self, FileStatus};
use crate::game::GameEntry;
use crate::state::GameState;
use crate::{LOCK_TIMEOUT, Result};

/// Report the status of every tracked file, ordered by relative path.
pub fn status(entry: &GameEntry) -> Result<BTreeMap<String, FileStatus>> {
    let lock = GameLock::acquire(&entry.lock_path(), LOCK_TIMEOUT)?;
    let state = GameState::load(&entry.state_path())?;

    let mut report = BTreeMap::new();
    for (relative, record) in state.files() {
        let current_checksum = read_optional(&entry.target_file(relative))?
            .map(|bytes| compute_checksum(&bytes));
        report.insert(
            relative.clone(),
            conflict::classify(record, current_checksum.as_deref()),
        );
    }

    lock.release()?;
    Ok(report)
}

//! Per-game paths
//!
//! A [`GameEntry`] is the validated configuration handed in by the caller:
//! where the live install lives and where backups go. The backup directory
//! also houses the state document and the lock marker.

use std::path::{Path, PathBuf};

/// File name of the state document inside a game's backup directory.
pub const STATE_FILE: &str = "state.json";

/// File name of the lock marker inside a game's backup directory.
pub const LOCK_FILE: &str = "patcher.lock";

/// A configured game: identifier plus target and backup directories.
#[derive(Debug, Clone)]
pub struct GameEntry {
    pub name: String,
    pub target: PathBuf,
    pub backup: PathBuf,
}

impl GameEntry {
    pub fn new(
        name: impl Into<String>,
        target: impl Into<PathBuf>,
        backup: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            backup: backup.into(),
        }
    }

    /// Path of the per-game state document.
    pub fn state_path(&self) -> PathBuf {
        self.backup.join(STATE_FILE)
    }

    /// Path of the per-game lock marker.
    pub fn lock_path(&self) -> PathBuf {
        self.backup.join(LOCK_FILE)
    }

    /// Absolute target path for a relative patch path.
    pub fn target_file(&self, relative: &str) -> PathBuf {
        join_relative(&self.target, relative)
    }

    /// Absolute backup path for a relative patch path.
    pub fn backup_file(&self, relative: &str) -> PathBuf {
        join_relative(&self.backup, relative)
    }
}

/// Join a `/`-separated relative path onto a base directory using native
/// separators.
fn join_relative(base: &Path, relative: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for part in relative.split('/') {
        path.push(part);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bookkeeping_paths_live_in_backup_dir() {
        let entry = GameEntry::new("demo", "/games/demo", "/backups/demo");
        assert_eq!(entry.state_path(), PathBuf::from("/backups/demo/state.json"));
        assert_eq!(entry.lock_path(), PathBuf::from("/backups/demo/patcher.lock"));
    }

    #[test]
    fn relative_paths_join_per_component() {
        let entry = GameEntry::new("demo", "/games/demo", "/backups/demo");
        assert_eq!(
            entry.target_file("data/config.ini"),
            PathBuf::from("/games/demo/data/config.ini")
        );
        assert_eq!(
            entry.backup_file("data/config.ini"),
            PathBuf::from("/backups/demo/data/config.ini")
        );
    }
}

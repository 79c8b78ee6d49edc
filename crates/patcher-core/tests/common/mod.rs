//! Shared fixture for engine integration tests

use std::fs;
use std::path::PathBuf;

use patcher_core::GameEntry;
use tempfile::TempDir;

/// A throwaway game install with target and backup directories.
pub struct Fixture {
    _tmp: TempDir,
    pub entry: GameEntry,
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("target");
        let backup = tmp.path().join("backup");
        fs::create_dir_all(&target).unwrap();

        let entry = GameEntry::new("demo", &target, &backup);
        Self { _tmp: tmp, entry }
    }

    pub fn target_path(&self, relative: &str) -> PathBuf {
        self.entry.target_file(relative)
    }

    pub fn backup_path(&self, relative: &str) -> PathBuf {
        self.entry.backup_file(relative)
    }

    pub fn write_target(&self, relative: &str, content: &[u8]) {
        let path = self.target_path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn read_target(&self, relative: &str) -> Vec<u8> {
        fs::read(self.target_path(relative)).unwrap()
    }

    pub fn read_backup(&self, relative: &str) -> Vec<u8> {
        fs::read(self.backup_path(relative)).unwrap()
    }

    pub fn state_doc(&self) -> Option<Vec<u8>> {
        fs::read(self.entry.state_path()).ok()
    }
}

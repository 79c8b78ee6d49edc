//! Persisted per-game tracking state
//!
//! One JSON document per game, stored in its backup directory, mapping
//! relative paths to checksum records. The document is the only memory the
//! patcher has between invocations: it is reloaded under lock on every
//! operation and written back atomically. Unknown fields in an existing
//! document are ignored for forward compatibility; a document that exists
//! but does not parse is an error, never an empty state.

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::{Error, Result};

/// Current state document format version.
const STATE_VERSION: &str = "1";

fn default_version() -> String {
    STATE_VERSION.to_string()
}

/// Checksums and backup provenance for one overlaid file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTrackingRecord {
    /// Checksum of the patch content last applied to this path.
    pub patch_checksum: String,
    /// Checksum the target file is expected to hold right now. Equals
    /// `patch_checksum` unless a re-backup resolution moved the baseline.
    pub applied_checksum: String,
    /// Whether a target file existed the first time this path was patched.
    pub existed_before_patch: bool,
    /// Checksum of the backed-up original. `Some` iff
    /// `existed_before_patch` and the backup copy is on disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_checksum: Option<String>,
}

/// The per-game state document: one tracking record per overlaid path.
///
/// `BTreeMap` keeps serialization order deterministic, so applying the same
/// patch set twice produces byte-identical documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    files: BTreeMap<String, FileTrackingRecord>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION.to_string(),
            files: BTreeMap::new(),
        }
    }

    /// Load the state document, holding a shared lock while reading.
    ///
    /// A missing document is an empty state; an unparseable one is
    /// [`Error::StateCorrupt`].
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(Error::io(path, e)),
        };
        file.lock_shared().map_err(|e| Error::io(path, e))?;

        // Read through the locked handle to avoid a TOCTOU race with a
        // concurrent save.
        let mut content = String::new();
        (&file)
            .read_to_string(&mut content)
            .map_err(|e| Error::io(path, e))?;

        serde_json::from_str(&content).map_err(|e| Error::StateCorrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Persist the state document with an atomic replace.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        patcher_fs::io::write_atomic(path, content.as_bytes())?;
        Ok(())
    }

    /// Remove the state document; absence is not an error.
    pub fn delete(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    /// All tracked records, ordered by relative path.
    pub fn files(&self) -> &BTreeMap<String, FileTrackingRecord> {
        &self.files
    }

    pub fn get(&self, relative: &str) -> Option<&FileTrackingRecord> {
        self.files.get(relative)
    }

    pub fn insert(&mut self, relative: String, record: FileTrackingRecord) {
        self.files.insert(relative, record);
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_record() -> FileTrackingRecord {
        FileTrackingRecord {
            patch_checksum: "sha256:aa".into(),
            applied_checksum: "sha256:aa".into(),
            existed_before_patch: true,
            original_checksum: Some("sha256:bb".into()),
        }
    }

    #[test]
    fn load_missing_document_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = GameState::load(&dir.path().join("state.json")).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut state = GameState::new();
        state.insert("game.exe".into(), sample_record());
        state.save(&path).unwrap();

        let loaded = GameState::load(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn corrupt_document_is_rejected_not_emptied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let err = GameState::load(&path).unwrap_err();
        assert!(matches!(err, Error::StateCorrupt { .. }));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{
              "version": "1",
              "future_field": 42,
              "files": {
                "a.txt": {
                  "patch_checksum": "sha256:aa",
                  "applied_checksum": "sha256:aa",
                  "existed_before_patch": false,
                  "planned_extension": true
                }
              }
            }"#,
        )
        .unwrap();

        let state = GameState::load(&path).unwrap();
        assert_eq!(state.len(), 1);
        assert_eq!(state.get("a.txt").unwrap().original_checksum, None);
    }

    #[test]
    fn save_is_byte_identical_for_identical_state() {
        let dir = tempfile::tempdir().unwrap();
        let path_a = dir.path().join("a.json");
        let path_b = dir.path().join("b.json");

        let mut state = GameState::new();
        state.insert("z.txt".into(), sample_record());
        state.insert("a.txt".into(), sample_record());

        state.save(&path_a).unwrap();
        state.save(&path_b).unwrap();

        assert_eq!(fs::read(&path_a).unwrap(), fs::read(&path_b).unwrap());
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        GameState::new().save(&path).unwrap();
        GameState::delete(&path).unwrap();
        GameState::delete(&path).unwrap();
        assert!(!path.exists());
    }
}

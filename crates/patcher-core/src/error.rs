//! Error types for patcher-core

use std::path::PathBuf;

/// Result type for patcher-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in patcher-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Persisted state document exists but cannot be parsed
    #[error("state document at {path} is corrupt: {message}")]
    StateCorrupt { path: PathBuf, message: String },

    /// A backup no longer matches the checksum recorded for it
    #[error(
        "backup for {path} no longer matches its recorded checksum \
         (expected {expected}, found {actual})"
    )]
    RestoreInconsistency {
        path: String,
        expected: String,
        actual: String,
    },

    /// A record claims a backup exists but the backup file is gone
    #[error("backup file missing for {path}")]
    BackupMissing { path: String },

    /// A patch set entry would escape the target directory
    #[error("patch set contains unsafe relative path: {path}")]
    UnsafePath { path: String },

    /// The game's install directory does not exist
    #[error("target directory does not exist: {path}")]
    TargetMissing { path: PathBuf },

    /// Non-I/O filesystem error from patcher-fs (lock contention and
    /// lock acquisition failures)
    #[error(transparent)]
    Fs(patcher_fs::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// I/O error with path context
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// I/O failures surface uniformly as [`Error::Io`] no matter which layer
/// they started in; only the lock errors keep their own shape.
impl From<patcher_fs::Error> for Error {
    fn from(err: patcher_fs::Error) -> Self {
        match err {
            patcher_fs::Error::Io { path, source } => Self::Io { path, source },
            other => Self::Fs(other),
        }
    }
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is lock contention from another live operation.
    pub fn is_lock_held(&self) -> bool {
        matches!(self, Self::Fs(patcher_fs::Error::LockHeld { .. }))
    }
}

//! Error types for patcher-fs

use std::path::PathBuf;

/// Result type for patcher-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in patcher-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("another patcher operation holds the lock at {path} (pid {pid}, held for {age_secs}s)")]
    LockHeld {
        path: PathBuf,
        pid: u32,
        age_secs: i64,
    },

    #[error("lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

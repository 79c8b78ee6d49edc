//! Core engine for the game patcher
//!
//! Orchestrates checksum-tracked file overlays: applying a patch set onto a
//! game's install directory, reverting it from backups, and reporting drift.
//!
//! Every operation follows the same shape: acquire the per-game lock
//! marker, load the state document, run, persist state if the operation
//! mutates, release the lock. Concurrency only ever comes from separate
//! process invocations, so the lock is a filesystem marker rather than an
//! in-process mutex.
//!
//! ```text
//!            patcher-cli
//!                 |
//!           patcher-core      apply / revert / status
//!                 |
//!            patcher-fs       checksums, atomic I/O, lock marker
//! ```

pub mod apply;
pub mod conflict;
pub mod error;
pub mod game;
pub mod patchset;
pub mod revert;
pub mod state;
pub mod status;

pub use apply::{ApplyOutcome, ApplyReport, ConflictInfo, apply};
pub use conflict::{ConflictOutcome, ConflictPolicy, FileStatus, classify, resolve};
pub use error::{Error, Result};
pub use game::GameEntry;
pub use patchset::{PatchFile, PatchSet};
pub use revert::{RevertReport, revert};
pub use state::{FileTrackingRecord, GameState};
pub use status::status;

/// How long operations wait for the per-game lock before failing fast.
pub const LOCK_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

//! Filesystem primitives for the game patcher
//!
//! Provides content checksums, atomic file replacement, and the
//! cross-process lock marker that serializes operations per game.

pub mod checksum;
pub mod error;
pub mod io;
pub mod lock;

pub use checksum::{compute_checksum, compute_file_checksum};
pub use error::{Error, Result};
pub use lock::{GameLock, LockInfo};

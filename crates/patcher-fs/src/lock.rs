//! Cross-process lock marker
//!
//! Apply, revert, and status run as independent CLI invocations, so mutual
//! exclusion has to be visible on the filesystem rather than in memory.
//! Each game's backup directory carries at most one `patcher.lock` marker;
//! acquisition atomically creates it with the holder's identity, and a
//! marker left behind by a dead or wedged holder is reclaimed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::{Error, Result};

/// A marker older than this is considered abandoned even when the holder
/// process cannot be probed.
const STALE_AFTER_SECS: i64 = 3600;

/// How long to sleep between acquisition attempts while a live holder
/// keeps the marker.
const RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Identity of the process holding a lock marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    pub pid: u32,
    pub acquired: DateTime<Utc>,
}

impl LockInfo {
    fn current() -> Self {
        Self {
            pid: std::process::id(),
            acquired: Utc::now(),
        }
    }

    /// Seconds since the marker was written. Negative on clock skew.
    pub fn age_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.acquired).num_seconds()
    }
}

/// Guard for the per-game lock.
///
/// The marker is removed on [`release`](GameLock::release) and on `Drop`,
/// so every exit path of the protected operation gives the lock back,
/// including panics unwinding through the guard.
#[derive(Debug)]
pub struct GameLock {
    path: PathBuf,
    info: LockInfo,
    released: bool,
}

impl GameLock {
    /// Acquire the lock for a game, retrying until `timeout` elapses.
    ///
    /// A stale marker (holder no longer alive, or older than the staleness
    /// threshold) is reclaimed rather than waited on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockHeld`] if a live holder keeps the marker past
    /// the timeout, or an I/O error if the marker cannot be created.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(lock) = Self::try_create(path)? {
                tracing::debug!(path = %path.display(), pid = lock.info.pid, "lock acquired");
                return Ok(lock);
            }

            match Self::read_marker(path)? {
                Some(holder) if holder_is_stale(&holder) => {
                    tracing::warn!(
                        path = %path.display(),
                        pid = holder.pid,
                        age_secs = holder.age_secs(),
                        "reclaiming stale lock marker"
                    );
                    // Another contender may win the race to remove it.
                    match fs::remove_file(path) {
                        Ok(()) => {}
                        Err(e) if e.kind() == ErrorKind::NotFound => {}
                        Err(e) => return Err(Error::io(path, e)),
                    }
                    continue;
                }
                Some(holder) => {
                    if Instant::now() >= deadline {
                        return Err(Error::LockHeld {
                            path: path.to_path_buf(),
                            pid: holder.pid,
                            age_secs: holder.age_secs().max(0),
                        });
                    }
                    std::thread::sleep(RETRY_INTERVAL);
                }
                // Marker vanished between create and read; try again.
                None => continue,
            }
        }
    }

    /// The identity recorded in the marker.
    pub fn info(&self) -> &LockInfo {
        &self.info
    }

    /// Release the lock, removing the marker.
    pub fn release(mut self) -> Result<()> {
        self.remove_marker()
    }

    /// Attempt to atomically create the marker. `Ok(None)` means another
    /// holder already has it.
    fn try_create(path: &Path) -> Result<Option<Self>> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(None),
            Err(e) => return Err(Error::io(path, e)),
        };

        let info = LockInfo::current();
        let content = serde_json::to_vec_pretty(&info).map_err(|e| {
            Error::io(path, std::io::Error::new(ErrorKind::InvalidData, e))
        })?;
        file.write_all(&content).map_err(|e| Error::io(path, e))?;
        file.sync_all().map_err(|e| Error::io(path, e))?;

        Ok(Some(Self {
            path: path.to_path_buf(),
            info,
            released: false,
        }))
    }

    /// Read the holder identity from an existing marker. `Ok(None)` when
    /// the marker is gone or not yet fully written; an unparseable marker
    /// is resolved through the file's age instead of its content.
    fn read_marker(path: &Path) -> Result<Option<LockInfo>> {
        let content = match fs::read(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(path, e)),
        };

        match serde_json::from_slice(&content) {
            Ok(info) => Ok(Some(info)),
            // A torn marker: the writer died mid-write or wrote garbage.
            // Fall back to the file's mtime to decide staleness.
            Err(_) => Ok(marker_info_from_mtime(path)),
        }
    }

    fn remove_marker(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }
}

impl Drop for GameLock {
    fn drop(&mut self) {
        if let Err(e) = self.remove_marker() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove lock marker");
        }
    }
}

/// Synthesize holder info for a marker whose content cannot be parsed,
/// using the file's modification time and an unknown pid.
fn marker_info_from_mtime(path: &Path) -> Option<LockInfo> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(LockInfo {
        pid: 0,
        acquired: DateTime::<Utc>::from(modified),
    })
}

/// A holder is stale when its marker has outlived the threshold or the
/// recorded process is no longer alive on this host.
fn holder_is_stale(info: &LockInfo) -> bool {
    if info.age_secs() > STALE_AFTER_SECS {
        return true;
    }
    info.pid != 0 && !process_is_alive(info.pid)
}

#[cfg(target_os = "linux")]
fn process_is_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(not(target_os = "linux"))]
fn process_is_alive(_pid: u32) -> bool {
    // No portable liveness probe; the age threshold alone decides.
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_creates_marker_with_holder_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patcher.lock");

        let lock = GameLock::acquire(&path, Duration::ZERO).unwrap();
        assert!(path.exists());
        assert_eq!(lock.info().pid, std::process::id());

        lock.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn second_acquire_fails_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patcher.lock");

        let _held = GameLock::acquire(&path, Duration::ZERO).unwrap();
        let err = GameLock::acquire(&path, Duration::ZERO).unwrap_err();
        match err {
            Error::LockHeld { pid, .. } => assert_eq!(pid, std::process::id()),
            other => panic!("expected LockHeld, got {other}"),
        }
    }

    #[test]
    fn drop_releases_the_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patcher.lock");

        {
            let _lock = GameLock::acquire(&path, Duration::ZERO).unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());

        // Reacquire succeeds after the drop.
        GameLock::acquire(&path, Duration::ZERO).unwrap();
    }

    #[test]
    fn stale_marker_from_dead_process_is_reclaimed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patcher.lock");

        let dead = LockInfo {
            // Max pid is far below this on any Linux we run on.
            pid: u32::MAX - 1,
            acquired: Utc::now(),
        };
        fs::write(&path, serde_json::to_vec(&dead).unwrap()).unwrap();

        let lock = GameLock::acquire(&path, Duration::ZERO).unwrap();
        assert_eq!(lock.info().pid, std::process::id());
    }

    #[test]
    fn old_marker_is_reclaimed_regardless_of_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patcher.lock");

        let aged = LockInfo {
            pid: std::process::id(),
            acquired: Utc::now() - chrono::Duration::seconds(STALE_AFTER_SECS + 60),
        };
        fs::write(&path, serde_json::to_vec(&aged).unwrap()).unwrap();

        GameLock::acquire(&path, Duration::ZERO).unwrap();
    }

    #[test]
    fn torn_marker_with_recent_mtime_counts_as_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patcher.lock");

        fs::write(&path, b"not json").unwrap();

        let err = GameLock::acquire(&path, Duration::ZERO).unwrap_err();
        assert!(matches!(err, Error::LockHeld { .. }));
    }
}

//! Advisory write lock.
//! Uses a sidecar marker file `<target>.lock` to signal "write in progress" to
//! other cooperating processes.
//!
//! Design:
//! - The marker is created with create-exclusive semantics; if it already
//!   exists, acquisition fails immediately with `LockContention` (no waiting).
//! - The marker holds the owner's pid as plain text, for diagnosing stale locks.
//! - The marker is removed when the LockFile guard is released or dropped, on
//!   every platform. Removal failures are logged and ignored.
//!
//! A crashed process leaves its marker behind; it has to be removed by hand.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use super::util::sibling_with_suffix;
use crate::errors::{OpenzError, Result};

/// RAII guard held while a target is locked.
#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
    released: bool,
}

impl LockFile {
    /// Path of the marker file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the marker now instead of waiting for drop.
    pub fn release(mut self) {
        self.remove_marker();
    }

    fn remove_marker(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => trace!(path = %self.path.display(), "lock released"),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to remove lock file; ignoring")
            }
        }
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        self.remove_marker();
    }
}

/// Marker path for `target`: `<target>.lock`.
pub fn lock_path(target: &Path) -> PathBuf {
    sibling_with_suffix(target, ".lock")
}

fn create_marker(path: &Path) -> io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    opts.mode(0o600);
    opts.open(path)
}

/// Acquire the lock for `target` without blocking.
/// Fails with `LockContention` if another session (or a stale marker) holds it.
pub fn acquire_lock(target: &Path) -> Result<LockFile> {
    let path = lock_path(target);
    let mut file = match create_marker(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            trace!(path = %path.display(), "lock contended");
            return Err(OpenzError::LockContention(path));
        }
        Err(e) => return Err(OpenzError::io("create lock file", &path)(e)),
    };

    let lock = LockFile { path, released: false };
    // The pid is informational; a marker without it still locks.
    if let Err(e) = writeln!(file, "{}", std::process::id()) {
        warn!(path = %lock.path.display(), error = %e, "could not record pid in lock file");
    }
    trace!(path = %lock.path.display(), "lock acquired");
    Ok(lock)
}

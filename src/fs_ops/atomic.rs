//! Atomic commit helpers.
//! - `replace_atomic`: rename staging -> target, replacing any existing file.
//!   `std::fs::rename` maps to rename(2) on Unix and MoveFileExW with
//!   MOVEFILE_REPLACE_EXISTING on Windows, so the target is never missing.
//! - `link_no_clobber`: publish staging at target only if target does not
//!   exist, using a hard link. The staging name stays; the caller removes it.
//! - On Unix, best-effort fsync of the destination directory afterwards.

use std::fs;
use std::io;
use std::path::Path;
use super::util::{fsync_dir, parent_dir};

pub fn replace_atomic(src: &Path, dst: &Path) -> io::Result<()> {
    fs::rename(src, dst)?;
    sync_parent(dst);
    Ok(())
}

/// Fails with `AlreadyExists` if `dst` exists. `src` is left in place either way.
pub fn link_no_clobber(src: &Path, dst: &Path) -> io::Result<()> {
    fs::hard_link(src, dst)?;
    sync_parent(dst);
    Ok(())
}

fn sync_parent(dst: &Path) {
    // Ignore fsync errors to avoid turning a successful rename into a failure.
    let _ = fsync_dir(parent_dir(dst));
}

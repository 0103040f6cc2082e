//! Single-slot backup of a target's previous content.
//!
//! Each target has at most one backup, `<target>.bak`. A qualifying snapshot
//! replaces it wholesale (copy to temp, then atomic rename); there is no history.
//!
//! Policies:
//! - `BeforeOverwrite`: the current content goes into the slot before the write
//!   proceeds, whatever the session outcome.
//! - `OnFault`: the current content is copied into a hidden holding file. It is
//!   promoted into the slot only if the session aborts, and discarded on commit,
//!   leaving any existing slot untouched.
//!
//! A target that does not exist yet has nothing to snapshot.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use super::atomic::replace_atomic;
use super::copy::{copy_to_temp_sibling, safe_copy_and_rename};
use super::util::sibling_with_suffix;
use crate::errors::{OpenzError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupPolicy {
    Disabled,
    BeforeOverwrite,
    OnFault,
}

/// Slot path for `target`: `<target>.bak`.
pub fn backup_path(target: &Path) -> PathBuf {
    sibling_with_suffix(target, ".bak")
}

/// Pre-write content held until the session outcome is known (`OnFault`).
/// Dropping it without `promote` discards the holding file.
#[derive(Debug)]
pub struct PendingBackup {
    held: PathBuf,
    slot: PathBuf,
    done: bool,
}

impl PendingBackup {
    /// Path of the hidden holding file.
    pub fn held_path(&self) -> &Path {
        &self.held
    }

    /// Move the held content into the slot, replacing any previous backup.
    pub fn promote(mut self) -> Result<()> {
        self.done = true;
        match replace_atomic(&self.held, &self.slot) {
            Ok(()) => {
                debug!(slot = %self.slot.display(), "fault backup written");
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_file(&self.held);
                Err(OpenzError::io("write backup", &self.slot)(e))
            }
        }
    }

    /// Throw the held content away; the slot is not touched.
    pub fn discard(mut self) {
        self.remove_held();
    }

    fn remove_held(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        match fs::remove_file(&self.held) {
            Ok(()) => trace!(path = %self.held.display(), "held backup discarded"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.held.display(), error = %e, "failed to remove held backup"),
        }
    }
}

impl Drop for PendingBackup {
    fn drop(&mut self) {
        self.remove_held();
    }
}

/// Take the snapshot `policy` asks for before `target` is opened for writing.
///
/// Returns `Some(PendingBackup)` only for `OnFault` on an existing target.
pub fn snapshot_before(target: &Path, policy: BackupPolicy) -> Result<Option<PendingBackup>> {
    if policy == BackupPolicy::Disabled {
        return Ok(None);
    }
    if !target.exists() {
        trace!(target = %target.display(), "no prior content; skipping snapshot");
        return Ok(None);
    }

    let slot = backup_path(target);
    match policy {
        BackupPolicy::BeforeOverwrite => {
            safe_copy_and_rename(target, &slot)
                .map_err(OpenzError::io("write backup", &slot))?;
            debug!(target = %target.display(), slot = %slot.display(), "backup written");
            Ok(None)
        }
        BackupPolicy::OnFault => {
            let held = copy_to_temp_sibling(target, target, "hold")
                .map_err(OpenzError::io("hold backup for", target))?;
            trace!(target = %target.display(), held = %held.display(), "holding pre-write content");
            Ok(Some(PendingBackup { held, slot, done: false }))
        }
        BackupPolicy::Disabled => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_target_never_snapshots() {
        let td = tempfile::tempdir().unwrap();
        let target = td.path().join("new.txt");
        for policy in [BackupPolicy::BeforeOverwrite, BackupPolicy::OnFault] {
            assert!(snapshot_before(&target, policy).unwrap().is_none());
        }
        assert!(!backup_path(&target).exists());
    }

    #[test]
    fn before_overwrite_replaces_slot() {
        let td = tempfile::tempdir().unwrap();
        let target = td.path().join("a.txt");
        fs::write(&target, "one").unwrap();
        snapshot_before(&target, BackupPolicy::BeforeOverwrite).unwrap();
        fs::write(&target, "two").unwrap();
        snapshot_before(&target, BackupPolicy::BeforeOverwrite).unwrap();
        assert_eq!(fs::read_to_string(backup_path(&target)).unwrap(), "two");
    }

    #[test]
    fn on_fault_promote_fills_slot() {
        let td = tempfile::tempdir().unwrap();
        let target = td.path().join("a.txt");
        fs::write(&target, "before").unwrap();
        let pending = snapshot_before(&target, BackupPolicy::OnFault).unwrap().unwrap();
        let held = pending.held_path().to_path_buf();
        assert!(!backup_path(&target).exists());
        pending.promote().unwrap();
        assert!(!held.exists());
        assert_eq!(fs::read_to_string(backup_path(&target)).unwrap(), "before");
    }

    #[test]
    fn on_fault_discard_keeps_old_slot() {
        let td = tempfile::tempdir().unwrap();
        let target = td.path().join("a.txt");
        fs::write(backup_path(&target), "older").unwrap();
        fs::write(&target, "before").unwrap();
        let pending = snapshot_before(&target, BackupPolicy::OnFault).unwrap().unwrap();
        let held = pending.held_path().to_path_buf();
        pending.discard();
        assert!(!held.exists());
        assert_eq!(fs::read_to_string(backup_path(&target)).unwrap(), "older");
    }

    #[test]
    fn dropping_pending_removes_holding_file() {
        let td = tempfile::tempdir().unwrap();
        let target = td.path().join("a.txt");
        fs::write(&target, "before").unwrap();
        let pending = snapshot_before(&target, BackupPolicy::OnFault).unwrap().unwrap();
        let held = pending.held_path().to_path_buf();
        drop(pending);
        assert!(!held.exists());
    }
}

//! Restore a target from its backup slot.
//!
//! Independent of any session: it only looks at `<target>.bak`. The slot is
//! copied (not moved) onto the target through a temp file and an atomic
//! rename, so the target is never left partial and the rollback can be repeated.

use std::io;
use std::path::Path;
use tracing::{debug, info};

use super::backup::backup_path;
use super::copy::safe_copy_and_rename;
use crate::errors::{OpenzError, Result};

/// Replace `path`'s content with its retained backup.
/// Returns `Ok(false)` without touching anything when there is no backup.
pub fn try_rollback(path: impl AsRef<Path>) -> Result<bool> {
    let target = path.as_ref();
    let slot = backup_path(target);
    if !slot.is_file() {
        debug!(target = %target.display(), "no backup to roll back to");
        return Ok(false);
    }

    match safe_copy_and_rename(&slot, target) {
        Ok(()) => {
            info!(target = %target.display(), slot = %slot.display(), "rolled back from backup");
            Ok(true)
        }
        // Slot vanished between the check and the copy.
        Err(e) if e.kind() == io::ErrorKind::NotFound && !slot.exists() => Ok(false),
        Err(e) => Err(OpenzError::io("restore backup onto", target)(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn no_slot_returns_false_and_leaves_target() {
        let td = tempfile::tempdir().unwrap();
        let target = td.path().join("a.txt");
        fs::write(&target, "current").unwrap();
        assert!(!try_rollback(&target).unwrap());
        assert_eq!(fs::read_to_string(&target).unwrap(), "current");
    }

    #[test]
    fn restores_and_keeps_slot() {
        let td = tempfile::tempdir().unwrap();
        let target = td.path().join("a.txt");
        fs::write(&target, "current").unwrap();
        fs::write(backup_path(&target), "previous").unwrap();

        assert!(try_rollback(&target).unwrap());
        assert_eq!(fs::read_to_string(&target).unwrap(), "previous");
        assert!(backup_path(&target).exists());

        fs::write(&target, "changed again").unwrap();
        assert!(try_rollback(&target).unwrap());
        assert_eq!(fs::read_to_string(&target).unwrap(), "previous");
    }

    #[test]
    fn restores_a_deleted_target() {
        let td = tempfile::tempdir().unwrap();
        let target = td.path().join("a.txt");
        fs::write(backup_path(&target), "previous").unwrap();
        assert!(try_rollback(&target).unwrap());
        assert_eq!(fs::read_to_string(&target).unwrap(), "previous");
    }
}

//! Filesystem operations: lock marker, atomic commit, backup slot, write
//! sessions and rollback.

mod atomic;
mod backup;
mod copy;
mod helpers;
mod lock;
mod rollback;
mod session;
mod util;

pub use atomic::{link_no_clobber, replace_atomic};
pub use backup::{BackupPolicy, PendingBackup, backup_path, snapshot_before};
pub use copy::safe_copy_and_rename;
pub use helpers::{hint_for, io_error_with_help, io_error_with_help_io};
pub use lock::{LockFile, acquire_lock, lock_path};
pub use rollback::try_rollback;
pub use session::{Payload, SessionState, WriteSession, open_for_write, write_with};

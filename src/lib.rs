//! Core library for `openz`.
//!
//! Transactional writes to a single file. A caller opens a [`WriteSession`]
//! with a [`WriteConfig`], writes through it, and either commits or aborts:
//!
//! - `atomic`: content is staged in a hidden sibling and renamed onto the
//!   target at commit, so a failed write leaves the target untouched.
//! - `lockfile`: `<target>.lock` marks the write as in progress; a second
//!   session fails fast with [`OpenzError::LockContention`].
//! - `backup`: the previous content is kept in `<target>.bak` (always, or only
//!   when the session aborts with `backup_on_fault`), and [`try_rollback`]
//!   restores it.
//!
//! ```no_run
//! use openz::{WriteConfig, write_with, try_rollback, OpenzError};
//!
//! let cfg = WriteConfig::new().with_text(true).with_overwrite(true).with_atomic(true).with_backup(true);
//! write_with("settings.toml", &cfg, |s| s.write("answer = 42\n"))?;
//! let restored = try_rollback("settings.toml")?;
//! # Ok::<(), OpenzError>(())
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod shutdown;

pub use config::{
    AppConfig, ContentMode, LogLevel, WriteConfig, default_config_path, default_log_path,
    load_app_config, load_app_config_from_path, path_has_symlink_ancestor,
};
pub use errors::OpenzError;
pub use fs_ops::{
    BackupPolicy, Payload, SessionState, WriteSession, backup_path, lock_path, open_for_write,
    try_rollback, write_with,
};

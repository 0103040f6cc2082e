//! Core configuration types.
//! - WriteConfig describes one requested write session.
//! - AppConfig holds binary-level settings (logging and default session flags).
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::Result;
use crate::fs_ops::{BackupPolicy, WriteSession, open_for_write};

/// Whether a session accepts text or raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentMode {
    /// UTF-8 text
    Text,
    /// Raw bytes (default)
    #[default]
    Binary,
}

impl fmt::Display for ContentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentMode::Text => "text",
            ContentMode::Binary => "binary",
        })
    }
}

/// Options for a single write session.
///
/// Behaves like `std::fs::OpenOptions`: build it once, then open any number of
/// sessions with [`WriteConfig::open`] or [`open_for_write`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteConfig {
    /// Text or binary content
    pub mode: ContentMode,
    /// Allow replacing an existing target
    pub overwrite: bool,
    /// Stage into a sibling temp file and rename onto the target at commit
    pub atomic: bool,
    /// Hold `<target>.lock` for the lifetime of the session
    pub lockfile: bool,
    /// Enforce "target must not exist" with a create-exclusive open.
    /// Cannot be combined with `atomic`; has no effect with `overwrite`.
    pub exclusive: bool,
    /// Keep the previous content in `<target>.bak`
    pub backup: bool,
    /// With `backup`: only keep the previous content if the session aborts
    pub backup_on_fault: bool,
}

impl WriteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: bool) -> Self {
        self.mode = if text { ContentMode::Text } else { ContentMode::Binary };
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    pub fn with_lockfile(mut self, lockfile: bool) -> Self {
        self.lockfile = lockfile;
        self
    }

    pub fn with_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    pub fn with_backup_on_fault(mut self, backup_on_fault: bool) -> Self {
        self.backup_on_fault = backup_on_fault;
        self
    }

    /// True when the target must not exist at open time.
    pub fn requires_absent_target(&self) -> bool {
        !self.overwrite
    }

    /// Snapshot policy derived from `backup` / `backup_on_fault`.
    pub fn backup_policy(&self) -> BackupPolicy {
        match (self.backup, self.backup_on_fault) {
            (false, _) => BackupPolicy::Disabled,
            (true, false) => BackupPolicy::BeforeOverwrite,
            (true, true) => BackupPolicy::OnFault,
        }
    }

    /// Open a write session on `path` with these options.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<WriteSession> {
        open_for_write(path, self)
    }
}

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// Session lifecycle details
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Settings for the `openz` binary.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Session flags applied before CLI overrides
    pub defaults: WriteConfig,
}

//! Typed error definitions for openz.
//! Every failure a write session or rollback can surface maps to one variant,
//! so callers can match on the kind instead of parsing messages.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::types::ContentMode;

#[derive(Debug, Error)]
pub enum OpenzError {
    #[error("Invalid write configuration: {0}")]
    Configuration(String),

    #[error("Target already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Lock file already present (another write in progress or stale lock): {0}")]
    LockContention(PathBuf),

    #[error("Content mode mismatch: session opened in {expected} mode, got {got} data")]
    ModeMismatch {
        expected: ContentMode,
        got: ContentMode,
    },

    #[error("Write to {path} failed: {source}")]
    WriteFault {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{op} {path} failed: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl OpenzError {
    /// Stable numeric code for logs and process exit status.
    pub fn code(&self) -> i32 {
        match self {
            OpenzError::Configuration(_) => 10,
            OpenzError::AlreadyExists(_) => 11,
            OpenzError::LockContention(_) => 12,
            OpenzError::ModeMismatch { .. } => 13,
            OpenzError::WriteFault { .. } => 20,
            OpenzError::Io { .. } => 21,
        }
    }

    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| OpenzError::Io { op, path, source }
    }

    pub(crate) fn write_fault(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| OpenzError::WriteFault { path, source }
    }
}

pub type Result<T, E = OpenzError> = std::result::Result<T, E>;

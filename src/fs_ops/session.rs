//! Write sessions.
//!
//! A session owns everything one write needs: the lock marker, the sink (the
//! target itself, or a hidden staging sibling in atomic mode) and, under the
//! fault-only backup policy, the held pre-write content.
//!
//! Lifecycle: `Opened -> Writing -> Committed | Aborted`.
//! - `commit` flushes and fsyncs the sink, publishes the staging file (atomic
//!   mode), finalizes the backup, then releases the lock.
//! - `abort`, or dropping an unfinished session (error or panic in the caller),
//!   closes the sink, removes the staging file, promotes a held backup into the
//!   slot, then releases the lock.
//!
//! Open order: validate options, take the lock, check the target, snapshot,
//! open the sink. Any failure releases what was already acquired.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::atomic::{link_no_clobber, replace_atomic};
use super::backup::{PendingBackup, snapshot_before};
use super::lock::{LockFile, acquire_lock};
use super::util::unique_temp_sibling;
use crate::config::types::{ContentMode, WriteConfig};
use crate::errors::{OpenzError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Opened,
    Writing,
    Committed,
    Aborted,
}

/// Data accepted by [`WriteSession::write`]; must match the session's mode.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl Payload<'_> {
    pub fn mode(&self) -> ContentMode {
        match self {
            Payload::Text(_) => ContentMode::Text,
            Payload::Bytes(_) => ContentMode::Binary,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(s) => s.as_bytes(),
            Payload::Bytes(b) => b,
        }
    }
}

impl<'a> From<&'a str> for Payload<'a> {
    fn from(s: &'a str) -> Self {
        Payload::Text(s)
    }
}

impl<'a> From<&'a String> for Payload<'a> {
    fn from(s: &'a String) -> Self {
        Payload::Text(s)
    }
}

impl<'a> From<&'a [u8]> for Payload<'a> {
    fn from(b: &'a [u8]) -> Self {
        Payload::Bytes(b)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Payload<'a> {
    fn from(b: &'a [u8; N]) -> Self {
        Payload::Bytes(b)
    }
}

impl<'a> From<&'a Vec<u8>> for Payload<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        Payload::Bytes(b)
    }
}

/// An open write on one target path. See the module docs for the lifecycle.
#[derive(Debug)]
pub struct WriteSession {
    target: PathBuf,
    config: WriteConfig,
    state: SessionState,
    sink: Option<BufWriter<File>>,
    staging: Option<PathBuf>,
    pending_backup: Option<PendingBackup>,
    lock: Option<LockFile>,
}

/// Open a write session on `path`.
///
/// Fails with `Configuration` for contradictory options, `LockContention` if
/// the lock marker exists, and `AlreadyExists` if the target exists while
/// `overwrite` is off.
pub fn open_for_write(path: impl AsRef<Path>, config: &WriteConfig) -> Result<WriteSession> {
    let target = path.as_ref().to_path_buf();
    config.validate()?;

    // Dropping `lock` on any early return below removes the marker.
    let lock = if config.lockfile {
        Some(acquire_lock(&target)?)
    } else {
        None
    };

    if config.requires_absent_target() && target.exists() {
        return Err(OpenzError::AlreadyExists(target));
    }

    let pending_backup = if config.requires_absent_target() {
        None
    } else {
        snapshot_before(&target, config.backup_policy())?
    };

    let (file, staging) = if config.atomic {
        let staging = unique_temp_sibling(&target, "stage");
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staging)
            .map_err(OpenzError::io("create staging file", &staging))?;
        (file, Some(staging))
    } else {
        (open_target_direct(&target, config)?, None)
    };

    debug!(
        target = %target.display(),
        mode = %config.mode,
        atomic = config.atomic,
        locked = lock.is_some(),
        backup = ?config.backup_policy(),
        "write session opened"
    );

    Ok(WriteSession {
        target,
        config: config.clone(),
        state: SessionState::Opened,
        sink: Some(BufWriter::new(file)),
        staging,
        pending_backup,
        lock,
    })
}

fn open_target_direct(target: &Path, config: &WriteConfig) -> Result<File> {
    let mut opts = OpenOptions::new();
    opts.write(true);
    if config.requires_absent_target() {
        opts.create_new(true);
    } else {
        opts.create(true).truncate(true);
    }
    match opts.open(target) {
        Ok(f) => Ok(f),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(OpenzError::AlreadyExists(target.to_path_buf()))
        }
        Err(e) => Err(OpenzError::io("open target", target)(e)),
    }
}

/// Scoped write: commit if `body` returns `Ok`, abort if it returns `Err`
/// (or panics).
pub fn write_with<T, E, F>(path: impl AsRef<Path>, config: &WriteConfig, body: F) -> Result<T, E>
where
    F: FnOnce(&mut WriteSession) -> Result<T, E>,
    E: From<OpenzError>,
{
    let mut session = open_for_write(path, config)?;
    match body(&mut session) {
        Ok(value) => {
            session.commit()?;
            Ok(value)
        }
        Err(e) => {
            if let Err(abort_err) = session.abort() {
                warn!(error = %abort_err, "abort after failed write did not complete cleanly");
            }
            Err(e)
        }
    }
}

impl WriteSession {
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn config(&self) -> &WriteConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Staging file path in atomic mode, until it is published or removed.
    pub fn staging_path(&self) -> Option<&Path> {
        self.staging.as_deref()
    }

    /// Write text or bytes; the kind must match the session's content mode.
    pub fn write<'a>(&mut self, data: impl Into<Payload<'a>>) -> Result<()> {
        let data = data.into();
        if data.mode() != self.config.mode {
            return Err(OpenzError::ModeMismatch {
                expected: self.config.mode,
                got: data.mode(),
            });
        }
        self.sink_write(data.as_bytes())
            .map_err(OpenzError::write_fault(self.sink_path()))
    }

    pub fn write_text(&mut self, text: &str) -> Result<()> {
        self.write(Payload::Text(text))
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write(Payload::Bytes(bytes))
    }

    fn sink_path(&self) -> &Path {
        self.staging.as_deref().unwrap_or(&self.target)
    }

    fn sink_write(&mut self, buf: &[u8]) -> io::Result<()> {
        let Some(sink) = self.sink.as_mut() else {
            return Err(io::Error::other("write session is closed"));
        };
        sink.write_all(buf)?;
        self.state = SessionState::Writing;
        Ok(())
    }

    /// Make the written content the target's content.
    /// On failure the abort path runs before the error is returned.
    pub fn commit(mut self) -> Result<()> {
        if let Err(e) = self.publish() {
            if let Err(abort_err) = self.abort_in_place() {
                warn!(error = %abort_err, "abort after failed commit did not complete cleanly");
            }
            return Err(e);
        }
        if let Some(pending) = self.pending_backup.take() {
            pending.discard();
        }
        self.state = SessionState::Committed;
        debug!(target = %self.target.display(), "write session committed");
        if let Some(lock) = self.lock.take() {
            lock.release();
        }
        Ok(())
    }

    /// Discard the session. Returns an error only if a held fault backup
    /// could not be written to the slot; cleanup still runs in full.
    pub fn abort(mut self) -> Result<()> {
        self.abort_in_place()
    }

    fn publish(&mut self) -> Result<()> {
        let sink_path = self.sink_path().to_path_buf();
        if let Some(sink) = self.sink.take() {
            let file = sink
                .into_inner()
                .map_err(|e| OpenzError::write_fault(&sink_path)(e.into_error()))?;
            file.sync_all().map_err(OpenzError::write_fault(&sink_path))?;
        }

        let Some(staging) = self.staging.clone() else {
            return Ok(());
        };
        preserve_permissions(&self.target, &staging);
        let published = if self.config.overwrite {
            replace_atomic(&staging, &self.target)
        } else {
            publish_no_clobber(&staging, &self.target)
        };
        match published {
            Ok(()) => {
                // After a rename the staging name is already gone.
                self.remove_staging();
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(OpenzError::AlreadyExists(self.target.clone()))
            }
            Err(e) => Err(OpenzError::write_fault(&self.target)(e)),
        }
    }

    fn abort_in_place(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.take() {
            // Close without flushing buffered bytes into the sink.
            let (file, _unflushed) = sink.into_parts();
            drop(file);
        }
        self.remove_staging();
        let backup_result = match self.pending_backup.take() {
            Some(pending) => pending.promote(),
            None => Ok(()),
        };
        self.state = SessionState::Aborted;
        debug!(target = %self.target.display(), atomic = self.config.atomic, "write session aborted");
        if let Some(lock) = self.lock.take() {
            lock.release();
        }
        backup_result
    }

    /// Unlink the staging name. On failure the path is kept so drop retries.
    fn remove_staging(&mut self) {
        let Some(staging) = self.staging.clone() else {
            return;
        };
        match fs::remove_file(&staging) {
            Ok(()) => self.staging = None,
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.staging = None,
            Err(e) => {
                warn!(path = %staging.display(), error = %e, "failed to remove staging file")
            }
        }
    }
}

impl Write for WriteSession {
    /// Binary sessions only; text sessions take `write_text`.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.config.mode == ContentMode::Text {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "session is in text mode; use write_text",
            ));
        }
        self.sink_write(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.sink.as_mut() {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for WriteSession {
    fn drop(&mut self) {
        match self.state {
            SessionState::Opened | SessionState::Writing => {
                if let Err(e) = self.abort_in_place() {
                    warn!(target = %self.target.display(), error = %e, "abort on drop did not complete cleanly");
                }
            }
            SessionState::Committed | SessionState::Aborted => self.remove_staging(),
        }
    }
}

// Hard links are not available everywhere (FAT, some network shares).
fn publish_no_clobber(staging: &Path, target: &Path) -> io::Result<()> {
    match link_no_clobber(staging, target) {
        Err(e) if e.kind() != io::ErrorKind::AlreadyExists && !target.exists() => {
            debug!(error = %e, "hard link unavailable; falling back to rename");
            replace_atomic(staging, target)
        }
        other => other,
    }
}

fn preserve_permissions(target: &Path, staging: &Path) {
    let Ok(meta) = fs::metadata(target) else {
        return;
    };
    if let Err(e) = fs::set_permissions(staging, meta.permissions()) {
        warn!(target = %target.display(), error = %e, "could not carry permissions over to replacement");
    }
}

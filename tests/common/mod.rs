//! Shared helpers for session integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use openz::WriteConfig;

static SEQ: AtomicUsize = AtomicUsize::new(0);

/// Every (text, atomic, lockfile, exclusive, flag) combination, where `flag` is
/// whatever the caller varies last (backup, or backup_on_fault).
pub fn grid() -> impl Iterator<Item = (bool, bool, bool, bool, bool)> {
    (0u8..32).map(|b| (b & 1 != 0, b & 2 != 0, b & 4 != 0, b & 8 != 0, b & 16 != 0))
}

/// Distinct payload of `len` ASCII characters.
pub fn payload(len: usize) -> String {
    let n = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("p{n}x").chars().cycle().take(len).collect()
}

/// Write `data` through one session, committing on success.
pub fn write_once(path: &Path, cfg: &WriteConfig, data: &str) -> Result<(), openz::OpenzError> {
    openz::write_with(path, cfg, |s| {
        if cfg.mode == openz::ContentMode::Text {
            s.write(data)
        } else {
            s.write(data.as_bytes())
        }
    })
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

/// Names of hidden staging/holding files left in `dir`.
pub fn leftover_temps(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with('.') && n.ends_with(".tmp"))
        .collect()
}

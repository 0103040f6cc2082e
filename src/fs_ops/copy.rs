//! Safe copy-and-rename helper:
//! - Copies to a hidden temp file next to the destination (created with O_EXCL)
//! - Fsyncs the temp file
//! - Atomically renames temp -> dest, so dest is never observed half-written
//!
//! Used for backup snapshots and for rollback.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::trace;

use super::atomic::replace_atomic;
use super::helpers::io_error_with_help_io;
use super::util::unique_temp_sibling;

/// Copy `src` into a fresh hidden sibling of `near`, fsynced, and return its path.
/// The temp file is removed again if the copy fails; the error keeps its kind
/// and gains a hint.
pub(crate) fn copy_to_temp_sibling(src: &Path, near: &Path, tag: &str) -> io::Result<PathBuf> {
    let tmp = unique_temp_sibling(near, tag);
    match copy_into_new(src, &tmp) {
        Ok(()) => Ok(tmp),
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(io_error_with_help_io("copy to temp from", src)(e))
        }
    }
}

fn copy_into_new(src: &Path, tmp: &Path) -> io::Result<()> {
    let input = File::open(src)?;
    let perms = input.metadata()?.permissions();
    let out = OpenOptions::new().write(true).create_new(true).open(tmp)?;

    let mut reader = BufReader::new(input);
    let mut writer = BufWriter::new(out);
    let copied = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    let out = writer.into_inner().map_err(|e| e.into_error())?;
    out.sync_all()?;
    drop(out);

    fs::set_permissions(tmp, perms)?;
    trace!(src = %src.display(), tmp = %tmp.display(), bytes = copied, "copied to temp");
    Ok(())
}

/// Copy `src` over `dest` via a temp file and an atomic rename.
pub fn safe_copy_and_rename(src: &Path, dest: &Path) -> io::Result<()> {
    let tmp = copy_to_temp_sibling(src, dest, "copy")?;
    if let Err(e) = replace_atomic(&tmp, dest) {
        // Best-effort cleanup of the temp file on failure.
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

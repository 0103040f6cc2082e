use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// `<target><suffix>` in the same directory, e.g. `a.txt` -> `a.txt.lock`.
pub(crate) fn sibling_with_suffix(target: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = target
        .file_name()
        .unwrap_or_else(|| OsStr::new("file"))
        .to_os_string();
    name.push(suffix);
    target.with_file_name(name)
}

/// Hidden, unique sibling of `target` for staging or holding content.
/// Pattern: `.<name>.openz.<tag>.<pid>.<nanos>.<seq>.tmp`
pub(crate) fn unique_temp_sibling(target: &Path, tag: &str) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let fname = target.file_name().unwrap_or_else(|| OsStr::new("file"));

    let mut name = OsString::from(".");
    name.push(fname);
    name.push(format!(".openz.{tag}.{pid}.{nanos}.{seq}.tmp"));
    parent_dir(target).join(name)
}

/// Parent directory of `path`, `.` for bare file names.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
pub(crate) fn fsync_dir(dir: &Path) -> io::Result<()> {
    let f = File::open(dir)?;
    f.sync_all()
}

#[cfg(windows)]
pub(crate) fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

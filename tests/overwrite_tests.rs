mod common;

use std::fs;

use common::{grid, leftover_temps, payload, read, write_once};
use openz::{OpenzError, WriteConfig, backup_path, lock_path, open_for_write, write_with};
use tempfile::tempdir;

#[test]
fn successive_overwrites_leave_last_content() {
    let td = tempdir().unwrap();
    for (i, (text, atomic, lockfile, exclusive, backup)) in grid().enumerate() {
        let path = td.path().join(format!("o{i}.txt"));
        let cfg = WriteConfig::new()
            .with_text(text)
            .with_overwrite(true)
            .with_atomic(atomic)
            .with_lockfile(lockfile)
            .with_exclusive(exclusive)
            .with_backup(backup);

        for size in [10usize, 20, 5] {
            let data = payload(size);
            let res = write_with(&path, &cfg, |s| {
                assert_eq!(lock_path(&path).is_file(), lockfile, "cfg: {cfg:?}");
                if text { s.write(&data) } else { s.write(data.as_bytes()) }
            });
            match res {
                Ok(()) => {
                    assert!(!(atomic && exclusive));
                    assert_eq!(read(&path), data, "cfg: {cfg:?}");
                }
                Err(OpenzError::Configuration(_)) => {
                    assert!(atomic && exclusive);
                    continue;
                }
                Err(e) => panic!("unexpected error {e} for {cfg:?}"),
            }
            assert!(!lock_path(&path).exists(), "lock left behind for {cfg:?}");
        }
    }
    assert!(leftover_temps(td.path()).is_empty());
}

#[test]
fn direct_overwrite_truncates_longer_content() {
    let td = tempdir().unwrap();
    let path = td.path().join("t.txt");
    fs::write(&path, "a much longer previous content").unwrap();
    write_once(&path, &WriteConfig::new().with_text(true).with_overwrite(true), "short").unwrap();
    assert_eq!(read(&path), "short");
}

#[test]
fn staged_commit_swaps_content_in_one_step() {
    let td = tempdir().unwrap();
    let path = td.path().join("s.txt");
    fs::write(&path, "old").unwrap();

    let cfg = WriteConfig::new().with_text(true).with_overwrite(true).with_atomic(true);
    let mut s = open_for_write(&path, &cfg).unwrap();
    s.write("new").unwrap();
    assert_eq!(read(&path), "old", "target must not change before commit");
    s.commit().unwrap();
    assert_eq!(read(&path), "new");
    assert!(leftover_temps(td.path()).is_empty());
}

#[test]
fn no_backup_slot_without_backup_option() {
    let td = tempdir().unwrap();
    let path = td.path().join("nb.txt");
    let cfg = WriteConfig::new().with_text(true).with_overwrite(true);
    write_once(&path, &cfg, "one").unwrap();
    write_once(&path, &cfg, "two").unwrap();
    assert!(!backup_path(&path).exists());
}

mod common;

use std::fs;

use common::{grid, leftover_temps, payload, read, write_once};
use openz::{OpenzError, WriteConfig, lock_path, open_for_write, write_with};
use tempfile::tempdir;

#[test]
fn write_then_second_write_without_overwrite_is_refused() {
    let td = tempdir().unwrap();
    for (i, (text, atomic, lockfile, exclusive, backup)) in grid().enumerate() {
        let path = td.path().join(format!("w{i}.txt"));
        let cfg = WriteConfig::new()
            .with_text(text)
            .with_atomic(atomic)
            .with_lockfile(lockfile)
            .with_exclusive(exclusive)
            .with_backup(backup);
        let data = payload(10);

        for step in 0..2 {
            let res = write_with(&path, &cfg, |s| {
                assert_eq!(lock_path(&path).is_file(), lockfile, "cfg: {cfg:?}");
                if text { s.write(&data) } else { s.write(data.as_bytes()) }
            });
            match res {
                Ok(()) => assert_eq!(step, 0, "cfg: {cfg:?}"),
                Err(OpenzError::Configuration(_)) => {
                    assert!(atomic && exclusive);
                    assert!(!path.exists() && !lock_path(&path).exists());
                    break;
                }
                Err(OpenzError::AlreadyExists(_)) => assert!(step > 0, "cfg: {cfg:?}"),
                Err(e) => panic!("unexpected error {e} for {cfg:?}"),
            }
            assert!(!lock_path(&path).exists(), "lock left behind for {cfg:?}");
            assert_eq!(read(&path), data);
        }
    }
    assert!(leftover_temps(td.path()).is_empty());
}

#[test]
fn binary_round_trip_keeps_every_byte() {
    let td = tempdir().unwrap();
    let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    for atomic in [false, true] {
        let path = td.path().join(format!("bin-{atomic}.dat"));
        let cfg = WriteConfig::new().with_atomic(atomic);
        write_with(&path, &cfg, |s| s.write(&bytes)).unwrap();
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }
}

#[test]
fn text_round_trip_keeps_unicode_and_newlines() {
    let td = tempdir().unwrap();
    let text = "first line\nsecond: héllo wörld ✓\r\nthird\n";
    for atomic in [false, true] {
        let path = td.path().join(format!("text-{atomic}.txt"));
        let cfg = WriteConfig::new().with_text(true).with_atomic(atomic);
        write_once(&path, &cfg, text).unwrap();
        assert_eq!(read(&path), text);
    }
}

#[test]
fn abc_scenario() {
    let td = tempdir().unwrap();
    let path = td.path().join("abc.txt");
    let cfg = WriteConfig::new().with_text(true);

    write_once(&path, &cfg, "abc").unwrap();
    assert_eq!(read(&path), "abc");

    let err = write_once(&path, &cfg, "xyz").unwrap_err();
    assert!(matches!(err, OpenzError::AlreadyExists(ref p) if p == &path));
    assert_eq!(read(&path), "abc");
}

#[test]
fn existing_target_refused_before_any_artifact() {
    let td = tempdir().unwrap();
    let path = td.path().join("exists.txt");
    fs::write(&path, "keep").unwrap();

    for atomic in [false, true] {
        let cfg = WriteConfig::new().with_atomic(atomic).with_lockfile(true).with_backup(true);
        let err = open_for_write(&path, &cfg).unwrap_err();
        assert!(matches!(err, OpenzError::AlreadyExists(_)));
    }
    let names: Vec<_> = fs::read_dir(td.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["exists.txt".to_string()]);
    assert_eq!(read(&path), "keep");
}

#[test]
fn exclusive_refuses_existing_target() {
    let td = tempdir().unwrap();
    let path = td.path().join("x.txt");
    fs::write(&path, "keep").unwrap();
    let cfg = WriteConfig::new().with_exclusive(true);
    let err = open_for_write(&path, &cfg).unwrap_err();
    assert!(matches!(err, OpenzError::AlreadyExists(_)));
    assert_eq!(read(&path), "keep");
}

#[test]
fn overwrite_takes_precedence_over_exclusive() {
    let td = tempdir().unwrap();
    let path = td.path().join("x.txt");
    fs::write(&path, "old").unwrap();
    let cfg = WriteConfig::new().with_text(true).with_overwrite(true).with_exclusive(true);
    write_once(&path, &cfg, "new").unwrap();
    assert_eq!(read(&path), "new");
}

#[test]
fn streaming_through_io_write() {
    use std::io::Write;
    let td = tempdir().unwrap();
    let path = td.path().join("stream.bin");
    let mut s = open_for_write(&path, &WriteConfig::new().with_atomic(true)).unwrap();
    for chunk in ["a", "bb", "ccc"] {
        s.write_all(chunk.as_bytes()).unwrap();
    }
    s.flush().unwrap();
    assert!(!path.exists(), "staged content must not reach the target before commit");
    s.commit().unwrap();
    assert_eq!(read(&path), "abbccc");
}

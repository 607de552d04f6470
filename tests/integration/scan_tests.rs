use mediasync::database::{DatabaseReader, FingerprintIndex};
use mediasync::scanner::{scan_to_database, WalkerConfig};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn db_paths(db: &Path) -> Vec<String> {
    let mut reader = DatabaseReader::open(db).unwrap();
    let (records, malformed) = reader.read_records().unwrap();
    assert!(malformed.is_empty());
    records.into_iter().map(|r| r.path).collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let tree = dir.path().join("tree");
    fs::create_dir(&tree).unwrap();
    let db = dir.path().join("db.dat");

    let summary = scan_to_database(&db, &[tree], &WalkerConfig::default(), None).unwrap();

    assert_eq!(summary.files_written, 0);
    assert!(!summary.has_errors());
    assert_eq!(fs::read_to_string(&db).unwrap(), "");
}

#[test]
fn test_scan_multiple_roots() {
    let dir = tempdir().unwrap();
    let music = dir.path().join("music");
    let video = dir.path().join("video");
    fs::create_dir_all(music.join("rock")).unwrap();
    fs::create_dir(&video).unwrap();
    fs::write(music.join("rock/a.mp3"), b"aaa").unwrap();
    fs::write(music.join("b.mp3"), b"bbb").unwrap();
    fs::write(video.join("c.avi"), b"aaa").unwrap();
    let db = dir.path().join("db.dat");

    let summary =
        scan_to_database(&db, &[music.clone(), video.clone()], &WalkerConfig::default(), None)
            .unwrap();
    assert_eq!(summary.files_written, 3);

    let paths = db_paths(&db);
    assert_eq!(paths.len(), 3);
    assert!(paths.contains(&music.join("rock/a.mp3").to_string_lossy().into_owned()));
    assert!(paths.contains(&video.join("c.avi").to_string_lossy().into_owned()));

    // Equal content, equal fingerprint
    let mut reader = DatabaseReader::open(&db).unwrap();
    let index = FingerprintIndex::build(&mut reader).unwrap();
    assert_eq!(index.len(), 3);
    assert_eq!(index.distinct(), 2);
}

#[test]
fn test_scan_skip_hidden() {
    let dir = tempdir().unwrap();
    let tree = dir.path().join("tree");
    fs::create_dir_all(tree.join(".cache")).unwrap();
    fs::write(tree.join("visible.mp3"), b"v").unwrap();
    fs::write(tree.join(".hidden.mp3"), b"h").unwrap();
    fs::write(tree.join(".cache/inner.mp3"), b"i").unwrap();

    let db = dir.path().join("all.dat");
    let summary =
        scan_to_database(&db, &[tree.clone()], &WalkerConfig::new(false, false), None).unwrap();
    assert_eq!(summary.files_written, 3);

    let db = dir.path().join("visible.dat");
    let summary =
        scan_to_database(&db, &[tree.clone()], &WalkerConfig::new(false, true), None).unwrap();
    assert_eq!(summary.files_written, 1);
    assert_eq!(
        db_paths(&db),
        vec![tree.join("visible.mp3").to_string_lossy().into_owned()]
    );
}

#[test]
fn test_scan_continues_past_missing_root() {
    let dir = tempdir().unwrap();
    let tree = dir.path().join("tree");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("a.mp3"), b"a").unwrap();
    let db = dir.path().join("db.dat");

    let summary = scan_to_database(
        &db,
        &[dir.path().join("missing"), tree],
        &WalkerConfig::default(),
        None,
    )
    .unwrap();

    assert_eq!(summary.walk_errors, 1);
    assert_eq!(summary.files_written, 1);
    assert!(summary.has_errors());
}

#[cfg(unix)]
#[test]
fn test_scan_symlinks_only_when_followed() {
    let dir = tempdir().unwrap();
    let tree = dir.path().join("tree");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("real.mp3"), b"r").unwrap();
    std::os::unix::fs::symlink(tree.join("real.mp3"), tree.join("link.mp3")).unwrap();

    let db = dir.path().join("plain.dat");
    let summary =
        scan_to_database(&db, &[tree.clone()], &WalkerConfig::new(false, false), None).unwrap();
    assert_eq!(summary.files_written, 1);

    let db = dir.path().join("followed.dat");
    let summary = scan_to_database(&db, &[tree], &WalkerConfig::new(true, false), None).unwrap();
    assert_eq!(summary.files_written, 2);
}

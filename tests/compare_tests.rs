//! Database comparison properties.

use mediasync::compare::{compare_databases, diff, CompareError, CompareOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_db(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

const DB_A: &str = "\
H1 100 /A/music/one.mp3
H2 200 /A/music/two.mp3
H3 300 /A/video/three.avi
H2 200 /A/backup/two.mp3
";

const DB_B: &str = "\
H1 100 /B/one.mp3
H4 400 /B/four.mp3
";

#[test]
fn test_self_diff_matches_everything() {
    let dir = tempdir().unwrap();
    let a = write_db(dir.path(), "a.dat", DB_A);

    let report = diff(&a, &a).unwrap();
    assert!(report.only_a.is_empty());
    assert!(report.only_b.is_empty());
    assert_eq!(report.match_a_to_b.len(), 4);
    assert_eq!(report.match_b_to_a.len(), 4);
    assert_eq!(report.sides[0].only_bytes, 0);
}

#[test]
fn test_self_diff_with_duplicates_uses_first_match() {
    let dir = tempdir().unwrap();
    let a = write_db(dir.path(), "a.dat", DB_A);

    let report = diff(&a, &a).unwrap();
    let partners: Vec<_> = report
        .match_a_to_b
        .iter()
        .filter(|(from, _)| from.ends_with("two.mp3"))
        .map(|(_, to)| to.as_str())
        .collect();
    assert_eq!(partners, vec!["/A/music/two.mp3", "/A/music/two.mp3"]);
}

#[test]
fn test_argument_swap_swaps_sides() {
    let dir = tempdir().unwrap();
    let a = write_db(dir.path(), "a.dat", DB_A);
    let b = write_db(dir.path(), "b.dat", DB_B);

    let ab = diff(&a, &b).unwrap();
    let ba = diff(&b, &a).unwrap();

    assert_eq!(ab.only_a, ba.only_b);
    assert_eq!(ab.only_b, ba.only_a);
    assert_eq!(ab.match_a_to_b, ba.match_b_to_a);
    assert_eq!(ab.match_b_to_a, ba.match_a_to_b);
    assert_eq!(ab.sides[0].only_bytes, ba.sides[1].only_bytes);
}

#[test]
fn test_exclusive_paths_and_bytes() {
    let dir = tempdir().unwrap();
    let a = write_db(dir.path(), "a.dat", DB_A);
    let b = write_db(dir.path(), "b.dat", DB_B);

    let report = diff(&a, &b).unwrap();
    assert_eq!(
        report.only_a,
        vec![
            "/A/backup/two.mp3",
            "/A/music/two.mp3",
            "/A/video/three.avi",
        ]
    );
    assert_eq!(report.only_b, vec!["/B/four.mp3"]);
    assert_eq!(report.sides[0].only_bytes, 700);
    assert_eq!(report.sides[0].only_count, 3);
    assert_eq!(report.sides[0].total, 4);
    assert_eq!(report.sides[1].only_bytes, 400);
}

#[test]
fn test_one_space_line_is_skipped() {
    let dir = tempdir().unwrap();
    let a = write_db(dir.path(), "a.dat", "H1 100\nH2 5 /a/x\n");
    let b = write_db(dir.path(), "b.dat", "H1 100 /b/y\n");

    let report = diff(&a, &b).unwrap();
    assert_eq!(report.only_a, vec!["/a/x"]);
    assert_eq!(report.only_b, vec!["/b/y"]);
    assert!(report.match_a_to_b.is_empty());
    assert_eq!(report.sides[0].skipped.len(), 1);
}

#[test]
fn test_compare_outputs_named_after_databases() {
    let dir = tempdir().unwrap();
    let a = write_db(dir.path(), "home.dat", DB_A);
    let b = write_db(dir.path(), "usb.dat", DB_B);
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    compare_databases(&a, &b, &out, &CompareOptions::default()).unwrap();

    for name in [
        "only-on-home.txt",
        "only-on-usb.txt",
        "copy-from-home.sh",
        "copy-from-usb.sh",
        "matches-from-home-to-usb.dat",
        "matches-from-usb-to-home.dat",
    ] {
        assert!(out.join(name).is_file(), "{name} missing");
    }

    let matches = fs::read_to_string(out.join("matches-from-home-to-usb.dat")).unwrap();
    assert_eq!(matches, "/A/music/one.mp3\t/B/one.mp3\n");

    let script = fs::read_to_string(out.join("copy-from-home.sh")).unwrap();
    let mkdirs: Vec<_> = script.lines().filter(|l| l.starts_with("mkdir")).collect();
    assert_eq!(
        mkdirs,
        vec![
            "mkdir -p \"$dest/backup\"",
            "mkdir -p \"$dest/music\"",
            "mkdir -p \"$dest/video\"",
        ]
    );
    assert!(script.contains("cp \"/A/video/three.avi\" \"$dest/video/three.avi\""));
}

#[test]
fn test_missing_database_is_fatal() {
    let dir = tempdir().unwrap();
    let a = write_db(dir.path(), "a.dat", DB_A);

    let result = compare_databases(
        &a,
        &dir.path().join("missing.dat"),
        dir.path(),
        &CompareOptions::default(),
    );
    assert!(matches!(result, Err(CompareError::Database(_))));
    assert!(!dir.path().join("only-on-a.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_scripts_executable_unless_disabled() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let a = write_db(dir.path(), "a.dat", DB_A);
    let b = write_db(dir.path(), "b.dat", DB_B);

    compare_databases(&a, &b, dir.path(), &CompareOptions::default()).unwrap();
    let mode = fs::metadata(dir.path().join("copy-from-a.sh"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o111, 0o111);

    let out = dir.path().join("plain");
    fs::create_dir(&out).unwrap();
    let options = CompareOptions {
        mark_executable: false,
    };
    compare_databases(&a, &b, &out, &options).unwrap();
    let mode = fs::metadata(out.join("copy-from-a.sh"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o100, 0);
}

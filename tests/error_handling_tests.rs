//! Exit codes and error reporting of `run_app`.

use clap::Parser;
use mediasync::cli::Cli;
use mediasync::error::{ExitCode, StructuredError};
use std::fs;
use tempfile::tempdir;

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["mediasync", "-q"];
    argv.extend_from_slice(args);
    mediasync::run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_hash_success() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("a.mp3");
    fs::write(&file, b"abc").unwrap();

    let result = run(&["hash", file.to_str().unwrap()]).unwrap();
    assert_eq!(result, ExitCode::Success);
}

#[test]
fn test_hash_failure_is_non_zero() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("a.mp3");
    fs::write(&good, b"abc").unwrap();
    let missing = dir.path().join("missing.mp3");

    let result = run(&["hash", good.to_str().unwrap(), missing.to_str().unwrap()]).unwrap();
    assert_eq!(result, ExitCode::GeneralError);
    assert_ne!(result.as_i32(), 0);
}

#[test]
fn test_scan_success() {
    let dir = tempdir().unwrap();
    let tree = dir.path().join("tree");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("a.mp3"), b"abc").unwrap();
    let db = dir.path().join("db.dat");

    let result = run(&["scan", db.to_str().unwrap(), tree.to_str().unwrap()]).unwrap();
    assert_eq!(result, ExitCode::Success);
    assert_eq!(fs::read_to_string(&db).unwrap().lines().count(), 1);
}

#[test]
fn test_scan_missing_dir_is_partial_success() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("db.dat");
    let missing = dir.path().join("missing");

    let result = run(&["scan", db.to_str().unwrap(), missing.to_str().unwrap()]).unwrap();
    assert_eq!(result, ExitCode::PartialSuccess);
}

#[cfg(unix)]
#[test]
fn test_scan_unreadable_dir_is_partial_success() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let tree = dir.path().join("tree");
    let locked = tree.join("locked");
    fs::create_dir_all(&locked).unwrap();
    fs::write(tree.join("ok.mp3"), b"ok").unwrap();
    fs::write(locked.join("hidden.mp3"), b"x").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Running as root ignores permissions
    let readable = fs::read_dir(&locked).is_ok();

    let db = dir.path().join("db.dat");
    let result = run(&["scan", db.to_str().unwrap(), tree.to_str().unwrap()]).unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    if readable {
        assert_eq!(result, ExitCode::Success);
    } else {
        assert_eq!(result, ExitCode::PartialSuccess);
        let content = fs::read_to_string(&db).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}

#[test]
fn test_scan_uncreatable_db_is_error() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("no/such/dir/db.dat");

    let result = run(&["scan", db.to_str().unwrap(), dir.path().to_str().unwrap()]);
    assert!(result.is_err());
}

#[test]
fn test_comp_missing_database_is_error() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.dat");
    fs::write(&a, "H 1 /a\n").unwrap();
    let b = dir.path().join("b.dat");

    let err = run(&[
        "comp",
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        dir.path().to_str().unwrap(),
    ])
    .unwrap_err();

    let structured = StructuredError::new(&err, ExitCode::GeneralError);
    assert_eq!(structured.code, "MS001");
    assert!(structured.message.contains("Could not compare"));
    assert!(structured.causes.iter().any(|c| c.contains("b.dat")));
}

#[test]
fn test_lsdup_writes_report() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("db.dat");
    fs::write(&db, "H1 100 /a\nH1 200 /b\nH2 50 /c\n").unwrap();
    let out = dir.path().join("dup.txt");

    let result = run(&["lsdup", db.to_str().unwrap(), out.to_str().unwrap()]).unwrap();
    assert_eq!(result, ExitCode::Success);

    let report = fs::read_to_string(&out).unwrap();
    assert!(report.starts_with("# "));
    assert!(report.contains("/a\n/b\n\n"));
    assert!(!report.contains("/c"));
}

#[test]
fn test_lsdup_missing_database_is_error() {
    let dir = tempdir().unwrap();
    let result = run(&[
        "lsdup",
        dir.path().join("missing.dat").to_str().unwrap(),
        dir.path().join("dup.txt").to_str().unwrap(),
    ]);
    assert!(result.is_err());
}

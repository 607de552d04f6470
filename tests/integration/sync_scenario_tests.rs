//! End-to-end: two trees scanned, compared and turned into copy scripts.

use clap::Parser;
use mediasync::cli::Cli;
use mediasync::error::ExitCode;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn run(dir: &Path, args: &[&str]) -> ExitCode {
    // Keep any user configuration out of the picture
    let config = dir.join("absent-config.toml");
    let mut argv = vec!["mediasync", "-q", "--config", config.to_str().unwrap()];
    argv.extend_from_slice(args);
    mediasync::run_app(Cli::try_parse_from(argv).unwrap()).unwrap()
}

struct Scenario {
    dir: TempDir,
    f1_a: PathBuf,
    f1_b: PathBuf,
    f2: PathBuf,
    f3: PathBuf,
}

impl Scenario {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let a = dir.path().join("A");
        let b = dir.path().join("B");
        fs::create_dir_all(a.join("albums")).unwrap();
        fs::create_dir_all(&b).unwrap();

        let f1: Vec<u8> = (0..1024u32).map(|i| (i % 251) as u8).collect();
        let f2: Vec<u8> = (0..2 * 1024 * 1024u32).map(|i| (i % 253) as u8).collect();

        let f1_a = a.join("f1.mp3");
        let f1_b = b.join("f1.mp3");
        let f2_path = a.join("albums/f2.mp3");
        let f3 = b.join("f3.mp3");
        fs::write(&f1_a, &f1).unwrap();
        fs::write(&f1_b, &f1).unwrap();
        fs::write(&f2_path, &f2).unwrap();
        fs::write(&f3, vec![7u8; 500]).unwrap();

        Self {
            dir,
            f1_a,
            f1_b,
            f2: f2_path,
            f3,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn scan_and_compare(&self) -> PathBuf {
        let root = self.dir.path();
        let out = self.path("out");
        fs::create_dir(&out).unwrap();

        for (db, tree) in [("a.dat", "A"), ("b.dat", "B")] {
            let code = run(
                root,
                &[
                    "scan",
                    self.path(db).to_str().unwrap(),
                    self.path(tree).to_str().unwrap(),
                ],
            );
            assert_eq!(code, ExitCode::Success);
        }

        let code = run(
            root,
            &[
                "comp",
                self.path("a.dat").to_str().unwrap(),
                self.path("b.dat").to_str().unwrap(),
                out.to_str().unwrap(),
            ],
        );
        assert_eq!(code, ExitCode::Success);
        out
    }
}

fn lossy(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn test_exclusive_lists() {
    let scenario = Scenario::new();
    let out = scenario.scan_and_compare();

    let only_a = fs::read_to_string(out.join("only-on-a.txt")).unwrap();
    assert_eq!(only_a, format!("{}\n", lossy(&scenario.f2)));

    let only_b = fs::read_to_string(out.join("only-on-b.txt")).unwrap();
    assert_eq!(only_b, format!("{}\n", lossy(&scenario.f3)));
}

#[test]
fn test_matches_in_both_directions() {
    let scenario = Scenario::new();
    let out = scenario.scan_and_compare();

    let a_to_b = fs::read_to_string(out.join("matches-from-a-to-b.dat")).unwrap();
    assert_eq!(
        a_to_b,
        format!("{}\t{}\n", lossy(&scenario.f1_a), lossy(&scenario.f1_b))
    );

    let b_to_a = fs::read_to_string(out.join("matches-from-b-to-a.dat")).unwrap();
    assert_eq!(
        b_to_a,
        format!("{}\t{}\n", lossy(&scenario.f1_b), lossy(&scenario.f1_a))
    );
}

#[test]
fn test_copy_script_for_first_tree() {
    let scenario = Scenario::new();
    let out = scenario.scan_and_compare();

    let script = fs::read_to_string(out.join("copy-from-a.sh")).unwrap();
    assert!(script.starts_with("#!/bin/sh\n"));

    let mkdirs: Vec<_> = script.lines().filter(|l| l.starts_with("mkdir -p ")).collect();
    let copies: Vec<_> = script.lines().filter(|l| l.starts_with("cp ")).collect();
    assert_eq!(mkdirs.len(), 1);
    assert_eq!(copies.len(), 1);
    assert_eq!(
        copies[0],
        format!("cp \"{}\" \"$dest/f2.mp3\"", lossy(&scenario.f2))
    );
}

#[test]
fn test_databases_list_every_file() {
    let scenario = Scenario::new();
    scenario.scan_and_compare();

    let a = fs::read_to_string(scenario.path("a.dat")).unwrap();
    let b = fs::read_to_string(scenario.path("b.dat")).unwrap();
    assert_eq!(a.lines().count(), 2);
    assert_eq!(b.lines().count(), 2);

    let f2_line = a.lines().find(|l| l.ends_with("f2.mp3")).unwrap();
    assert!(f2_line.starts_with("02-"));
    assert!(f2_line.contains(&format!(" {} ", 2 * 1024 * 1024)));

    let f1_a = a.lines().find(|l| l.ends_with("f1.mp3")).unwrap();
    let f1_b = b.lines().find(|l| l.ends_with("f1.mp3")).unwrap();
    assert!(f1_a.starts_with("0F-"));
    assert_eq!(f1_a.split(' ').next(), f1_b.split(' ').next());
}

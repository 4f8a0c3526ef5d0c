#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use predicates::prelude::*;
use tempfile::{tempdir, TempDir};

const FLS: &str = r#"#!/bin/sh
case "$*" in
  *" -d "*)
    [ -n "$FAIL_DELETED" ] && { echo "cannot walk deleted entries" >&2; exit 1; }
    printf 'r/r * 40-128-1:\tRecycled/old.pdf\n'
    printf 'r/r * 41-128-1:\tRecycled/lost.pdf\n'
    ;;
  *)
    printf 'r/r 12-128-1:\tdocs/report.pdf\n'
    printf 'r/r 13-128-1:\tnotes.txt\n'
    ;;
esac
"#;

const ICAT: &str = r#"#!/bin/sh
case "$2" in
  12-128-1) printf '%%PDF-1.4\n%%%%EOF\n' ;;
  13-128-1) printf 'nothing to see\n' ;;
  40-128-1) printf '%%PDF-1.7\n%%%%EOF\n' ;;
  *) echo "inode not allocated" >&2; exit 1 ;;
esac
"#;

const FSSTAT: &str = r#"#!/bin/sh
if [ "$1" = "-t" ]; then
  echo fat16
else
  printf 'FILE SYSTEM INFORMATION\n--------------------------------------------\nFile System Type: FAT16\n'
fi
"#;

struct Fixture {
    dir: TempDir,
    image: PathBuf,
    config: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().expect("tempdir");
        let bin = dir.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        let fls = write_script(&bin, "fls", FLS);
        let icat = write_script(&bin, "icat", ICAT);
        let fsstat = write_script(&bin, "fsstat", FSSTAT);

        let config = dir.path().join("tools.json");
        let body = serde_json::json!({
            "fls": fls,
            "icat": icat,
            "fsstat": fsstat,
            "timeout_secs": 30,
        });
        fs::write(&config, serde_json::to_string_pretty(&body).unwrap()).unwrap();

        let image = dir.path().join("usb.dd");
        fs::write(&image, b"raw image bytes").unwrap();
        Self { dir, image, config }
    }

    fn output(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn rip(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("image-ripper");
        cmd.arg("rip")
            .arg(&self.image)
            .arg("--output")
            .arg(self.output())
            .arg("--tools-config")
            .arg(&self.config)
            .arg("--sniffer")
            .arg("signature");
        cmd
    }
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn rip_extracts_catalogs_and_reports() {
    let fx = Fixture::new();
    fx.rip()
        .assert()
        .success()
        .stdout(predicate::str::contains("Filesystem type: fat16"))
        .stdout(predicate::str::contains("Failed entries: 1"));

    let out = fx.output();
    assert!(out.join("overt/report.pdf").is_file());
    assert!(!out.join("overt/notes.txt").exists());
    assert!(out.join("deleted/old.pdf").is_file());
    assert!(!out.join("deleted/lost.pdf").exists());

    let report = fs::read_to_string(out.join("report.txt")).unwrap();
    assert!(report.contains("Here is the information for"));
    assert!(report.contains("File System Type: FAT16"));
    assert!(report.contains("Failed entries:"));

    let listed = assert_cmd::cargo::cargo_bin_cmd!("image-ripper")
        .arg("list-artifacts")
        .arg("--db")
        .arg(out.join("ripper.sqlite"))
        .arg("--json")
        .output()
        .expect("list artifacts");
    assert!(listed.status.success());
    let artifacts: Vec<serde_json::Value> = serde_json::from_slice(&listed.stdout).unwrap();
    assert_eq!(artifacts.len(), 3);
    let useful: Vec<_> =
        artifacts.iter().filter(|a| a["artifact_class"] == "pdf").map(|a| &a["location"]).collect();
    assert_eq!(useful, vec!["12-128-1", "40-128-1"]);
}

#[test]
fn deleted_filter_and_verify_after_rip() {
    let fx = Fixture::new();
    fx.rip().assert().success();
    let db = fx.output().join("ripper.sqlite");

    let listed = assert_cmd::cargo::cargo_bin_cmd!("image-ripper")
        .arg("list-artifacts")
        .arg("--db")
        .arg(&db)
        .arg("--deleted")
        .arg("--json")
        .output()
        .expect("list deleted");
    let artifacts: Vec<serde_json::Value> = serde_json::from_slice(&listed.stdout).unwrap();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0]["provenance"], "deleted");

    assert_cmd::cargo::cargo_bin_cmd!("image-ripper")
        .arg("verify")
        .arg("--db")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("Checked: 2"));

    fs::write(fx.output().join("overt/report.pdf"), b"tampered").unwrap();
    assert_cmd::cargo::cargo_bin_cmd!("image-ripper")
        .arg("verify")
        .arg("--db")
        .arg(&db)
        .assert()
        .failure()
        .stdout(predicate::str::contains("CHANGED"));
}

#[test]
fn rerun_appends_second_image() {
    let fx = Fixture::new();
    fx.rip().assert().success();
    fx.rip().arg("--layout").arg("by-location").assert().success();
    assert!(fx.output().join("overt/12-128-1_report.pdf").is_file());

    let listed = assert_cmd::cargo::cargo_bin_cmd!("image-ripper")
        .arg("list-images")
        .arg("--db")
        .arg(fx.output().join("ripper.sqlite"))
        .arg("--json")
        .output()
        .expect("list images");
    let images: Vec<serde_json::Value> = serde_json::from_slice(&listed.stdout).unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[1]["total_useful_bytes"], images[0]["total_useful_bytes"]);
}

#[test]
fn failing_listing_aborts_run_naming_the_tool() {
    let fx = Fixture::new();
    fx.rip()
        .env("FAIL_DELETED", "1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("fls"))
        .stderr(predicate::str::contains("cannot walk deleted entries"));
    assert!(!fx.output().join("ripper.sqlite").exists());
}

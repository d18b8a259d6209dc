#![allow(deprecated)] // cargo_bin deprecation

use std::path::Path;

use assert_cmd::Command;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;
use tempfile::TempDir;

fn nfce(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nfce").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home);
    cmd
}

fn write_blank_png(path: &Path) {
    RgbaImage::from_pixel(120, 90, Rgba([255, 255, 255, 255]))
        .save(path)
        .unwrap();
}

#[test]
fn test_help_lists_subcommands() {
    let tmp = TempDir::new().unwrap();

    nfce(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_process_missing_file() {
    let tmp = TempDir::new().unwrap();

    nfce(tmp.path())
        .args(["process", "does-not-exist.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_rejects_non_image_extension() {
    let tmp = TempDir::new().unwrap();
    let notes = tmp.path().join("notes.txt");
    std::fs::write(&notes, "not a receipt").unwrap();

    nfce(tmp.path())
        .arg("process")
        .arg(&notes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn test_process_photo_without_qr() {
    let tmp = TempDir::new().unwrap();
    let photo = tmp.path().join("receipt.png");
    write_blank_png(&photo);

    nfce(tmp.path())
        .arg("process")
        .arg(&photo)
        .assert()
        .failure()
        .stderr(predicate::str::contains("locate stage failed"))
        .stderr(predicate::str::contains("no QR code detected"));
}

#[test]
fn test_batch_continues_past_failures() {
    let tmp = TempDir::new().unwrap();
    write_blank_png(&tmp.path().join("a.png"));
    write_blank_png(&tmp.path().join("b.png"));
    let out = tmp.path().join("out");
    let pattern = tmp.path().join("*.png");

    nfce(tmp.path())
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(&out)
        .args(["--continue-on-error", "--summary", "-j", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 successful, 2 failed"));

    let summary = std::fs::read_to_string(out.join("summary.json")).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["failed"], 2);
    assert_eq!(summary["files"][0]["stage"], "locate");
}

#[test]
fn test_batch_stops_on_first_failure() {
    let tmp = TempDir::new().unwrap();
    write_blank_png(&tmp.path().join("a.png"));
    let pattern = tmp.path().join("*.png");

    nfce(tmp.path())
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn test_config_init_get_set() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("nfce.json");

    nfce(tmp.path())
        .args(["config", "init", "--output"])
        .arg(&config)
        .assert()
        .success();
    assert!(config.exists());

    nfce(tmp.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "crop.padding"])
        .assert()
        .success()
        .stdout(predicate::str::contains("20"));

    nfce(tmp.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "decoder.strategy", "remote"])
        .assert()
        .success();

    nfce(tmp.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "decoder.strategy"])
        .assert()
        .success()
        .stdout(predicate::str::diff("remote\n"));
}

#[test]
fn test_config_set_rejects_invalid_strategy() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("nfce.json");

    nfce(tmp.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "decoder.strategy", "zxing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for decoder.strategy"));
    assert!(!config.exists());
}

#[test]
fn test_config_init_refuses_overwrite() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("nfce.json");
    std::fs::write(&config, "{}").unwrap();

    nfce(tmp.path())
        .args(["config", "init", "--output"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_config_path_honours_override() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("custom.json");

    nfce(tmp.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.json"))
        .stdout(predicate::str::contains("not created"));
}

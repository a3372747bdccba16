//! CLI Integration Tests for lithe-shim
//!
//! Runs the built binary end to end.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Path to the lithe-shim binary built for this test run
fn shim_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_lithe-shim"))
}

#[test]
fn test_probe_both_forms() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("payload.bin");
    fs::write(&input, (0..=255u8).collect::<Vec<_>>()).unwrap();

    let output = Command::new(shim_binary())
        .current_dir(dir.path())
        .args(["probe", input.to_str().unwrap()])
        .output()
        .expect("Failed to run lithe-shim");

    assert!(
        output.status.success(),
        "probe failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("packed"));
    assert!(stdout.contains("boxed"));
    assert!(stdout.contains("size=256"));
    assert!(!stdout.contains("MISMATCH"));
}

#[test]
fn test_probe_single_form() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.bin");
    fs::write(&input, b"").unwrap();

    let output = Command::new(shim_binary())
        .current_dir(dir.path())
        .args(["probe", "--form", "boxed", input.to_str().unwrap()])
        .output()
        .expect("Failed to run lithe-shim");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("boxed"));
    assert!(!stdout.contains("packed"));
    assert!(stdout.contains("size=0"));
}

#[test]
fn test_probe_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(shim_binary())
        .current_dir(dir.path())
        .args(["probe", "does-not-exist.bin"])
        .output()
        .expect("Failed to run lithe-shim");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}

#[test]
fn test_config_prints_loaded_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("lithe.toml"),
        "[lean]\ntoolchain = \"leanprover/lean4:v4.9.0\"\n",
    )
    .unwrap();

    let output = Command::new(shim_binary())
        .current_dir(dir.path())
        .arg("config")
        .output()
        .expect("Failed to run lithe-shim");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("leanprover/lean4:v4.9.0"));
    assert!(stdout.contains("[logging]"));
}

#[test]
fn test_sysroot_reports_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("lithe.toml"),
        "[lean]\nsysroot = \"/nonexistent/lean/sysroot\"\n",
    )
    .unwrap();

    let output = Command::new(shim_binary())
        .current_dir(dir.path())
        .arg("sysroot")
        .output()
        .expect("Failed to run lithe-shim");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}

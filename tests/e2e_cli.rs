//! CLI end-to-end tests
//!
//! Tests for the toolshed command-line interface. Every test points the
//! binary at its own settings file and application directory.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::{tempdir, TempDir};

/// Get a command for the toolshed binary, isolated in `dir`
#[allow(deprecated)]
fn toolshed_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("toolshed").unwrap();
    cmd.arg("--config")
        .arg(dir.join("settings.toml"))
        .arg("--app-dir")
        .arg(dir)
        .env_remove("RUST_LOG");
    cmd
}

/// Workspace whose transcoder directory holds `/bin/sh` posing as ffmpeg and ffprobe.
#[cfg(unix)]
fn shell_transcoder() -> TempDir {
    let tmp = tempdir().unwrap();
    let bin = tmp.path().join("ffmpeg");
    fs::create_dir(&bin).unwrap();
    for name in ["ffmpeg", "ffprobe"] {
        std::os::unix::fs::symlink("/bin/sh", bin.join(name)).unwrap();
    }
    toolshed_cmd(tmp.path())
        .args(["set-path", "transcoder", "./ffmpeg"])
        .assert()
        .success();
    tmp
}

#[test]
fn test_cli_no_args_shows_help() {
    let tmp = tempdir().unwrap();
    toolshed_cmd(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let tmp = tempdir().unwrap();
    toolshed_cmd(tmp.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("toolshed "));
}

#[test]
fn test_cli_version_ignores_broken_settings() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("settings.toml"), "[thirdparty\n").unwrap();

    toolshed_cmd(tmp.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("toolshed "));

    toolshed_cmd(tmp.path())
        .arg("check-tools")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse"));
}

#[test]
fn test_cli_check_tools_json() {
    let tmp = tempdir().unwrap();
    let output = toolshed_cmd(tmp.path())
        .args(["check-tools", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let statuses: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let statuses = statuses.as_array().unwrap();
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0]["tool"], "transcoder");
    assert_eq!(statuses[1]["tool"], "lipsync");
    for status in statuses {
        assert_eq!(status["directory"], "");
        assert_eq!(status["configured"], false);
        assert_eq!(status["timeout_secs"], 600);
    }
}

#[test]
fn test_cli_set_timeout_persists() {
    let tmp = tempdir().unwrap();
    toolshed_cmd(tmp.path())
        .args(["set-timeout", "lipsync", "-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set lipsync timeout to -1"));

    let content = fs::read_to_string(tmp.path().join("settings.toml")).unwrap();
    assert!(content.contains("[thirdparty]"));
    assert!(content.contains("lipsync-timeout = -1"));

    // Same value again is a no-op.
    toolshed_cmd(tmp.path())
        .args(["set-timeout", "lipsync", "-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already"));

    toolshed_cmd(tmp.path())
        .arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("no timeout"));
}

#[test]
fn test_cli_unknown_tool_rejected() {
    let tmp = tempdir().unwrap();
    toolshed_cmd(tmp.path())
        .args(["set-path", "blender", "/usr/bin"])
        .assert()
        .failure();
}

#[test]
fn test_cli_run_unconfigured_tool() {
    let tmp = tempdir().unwrap();
    toolshed_cmd(tmp.path())
        .args(["set-path", "lipsync", "/nonexistent/rhubarb"])
        .assert()
        .success();

    toolshed_cmd(tmp.path())
        .args(["run", "rhubarb", "--", "--version"])
        .assert()
        .code(127)
        .stderr(predicate::str::contains("not configured"));
}

#[cfg(unix)]
#[test]
fn test_cli_run_passes_output_through() {
    let tmp = shell_transcoder();
    toolshed_cmd(tmp.path())
        .args(["run", "ffprobe", "--", "-c", "echo probed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("probed"));
}

#[cfg(unix)]
#[test]
fn test_cli_run_propagates_exit_code() {
    let tmp = shell_transcoder();
    toolshed_cmd(tmp.path())
        .args(["run", "ffmpeg", "--", "-c", "echo broken >&2; exit 3"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("broken"));
}

#[cfg(unix)]
#[test]
fn test_cli_run_times_out() {
    let tmp = shell_transcoder();
    toolshed_cmd(tmp.path())
        .args(["set-timeout", "transcoder", "1"])
        .assert()
        .success();

    toolshed_cmd(tmp.path())
        .args(["run", "ffmpeg", "--", "-c", "exec sleep 30"])
        .assert()
        .code(124)
        .stderr(predicate::str::contains("timed out"));
}

#[cfg(unix)]
#[test]
fn test_cli_init_keeps_valid_directory() {
    let tmp = shell_transcoder();
    toolshed_cmd(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("transcoder already configured"));
}

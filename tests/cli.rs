#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn cmdlog() -> Command {
    let mut cmd = Command::cargo_bin("cmdlog").unwrap();
    cmd.env_remove("CMDLOG_PREFIX")
        .env_remove("CMDLOG_TAG")
        .env_remove("CMDLOG_WORKDIR");
    cmd
}

fn only_log(dir: &std::path::Path) -> String {
    let entries: Vec<_> = fs::read_dir(dir).unwrap().map(|e| e.unwrap().path()).collect();
    assert_eq!(entries.len(), 1, "expected one log file, got {entries:?}");
    fs::read_to_string(&entries[0]).unwrap()
}

#[test]
fn run_echoes_and_logs() {
    let dir = tempfile::tempdir().unwrap();
    let logs = dir.path().join("logs");

    cmdlog()
        .arg("run")
        .arg("--prefix")
        .arg(logs.join("echo-"))
        .args(["--", "echo", "hello"])
        .assert()
        .success()
        .stdout("cmdlog: running command: echo hello\nhello\n");

    assert_eq!(only_log(&logs), "cmdlog: running command: echo hello\nhello\n");
}

#[test]
fn tag_from_env_and_quiet_mode() {
    let dir = tempfile::tempdir().unwrap();

    cmdlog()
        .env("CMDLOG_TAG", "ci")
        .env("CMDLOG_PREFIX", dir.path().join("q-"))
        .args(["run", "--quiet", "--", "sh", "-c", "echo hi"])
        .assert()
        .success()
        .stdout("");

    assert_eq!(only_log(dir.path()), "ci: running command: sh -c echo hi\nhi\n");
}

#[test]
fn failing_command_fails_and_keeps_log() {
    let dir = tempfile::tempdir().unwrap();

    cmdlog()
        .arg("run")
        .arg("--prefix")
        .arg(dir.path().join("fail-"))
        .args(["--json", "--quiet", "--", "sh", "-c", "echo partial; exit 4"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"exit_code\": 4"))
        .stdout(predicate::str::contains("\"success\": false"));

    let log = only_log(dir.path());
    assert!(log.starts_with("cmdlog: running command: sh -c echo partial; exit 4\n"));
    assert!(log.ends_with("partial\n"));
}

#[test]
fn check_reports_missing_commands() {
    cmdlog()
        .args(["check", "sh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"found\": true"));

    cmdlog()
        .args(["check", "cmdlog-definitely-not-a-real-command"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found on PATH"));
}

#[test]
fn command_flags_pass_through_without_separator() {
    let dir = tempfile::tempdir().unwrap();

    cmdlog()
        .arg("run")
        .arg("--prefix")
        .arg(dir.path().join("nosep-"))
        .args(["sh", "-c", "echo out; echo err >&2"])
        .assert()
        .success()
        .stdout("cmdlog: running command: sh -c echo out; echo err >&2\nout\nerr\n");

    assert_eq!(
        only_log(dir.path()),
        "cmdlog: running command: sh -c echo out; echo err >&2\nout\nerr\n"
    );
}

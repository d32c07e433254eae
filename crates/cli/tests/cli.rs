//! End-to-end tests that invoke the `scriptable` binary
//!
//! Each test writes a service description into a temporary directory and runs
//! the binary from there, so relative script paths resolve against it.

#![cfg(unix)]
#![allow(clippy::unwrap_used, clippy::panic)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn scriptable(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_scriptable"));
    cmd.current_dir(dir)
        .env_remove("SCRIPTABLE_SERVICE")
        .env_remove("RUST_LOG");
    cmd
}

fn service(content: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("serverless.yml"), content).unwrap();
    dir
}

#[test]
fn test_run_hooks_in_order() {
    let dir = service(
        r"
service: demo
custom:
  scriptable:
    hooks:
      before:deploy:deploy:
        - echo A
        - echo B
",
    );

    scriptable(dir.path())
        .args(["run", "before:deploy:deploy"])
        .assert()
        .success()
        .stdout("Running command: echo A\nA\nRunning command: echo B\nB\n");
}

#[test]
fn test_suppressed_output() {
    let dir = service(
        r"
custom:
  scriptable:
    showCommands: false
    showStdoutOutput: false
    hooks:
      deploy: echo hidden
",
    );

    scriptable(dir.path())
        .args(["run", "deploy"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_failing_command_exits_non_zero() {
    let dir = service(
        r"
custom:
  scriptable:
    hooks:
      deploy:
        - not-exists
        - echo never
",
    );

    scriptable(dir.path())
        .args(["run", "deploy"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("never").not())
        .stderr(predicate::str::contains("Failed to run command: not-exists"));
}

#[test]
fn test_script_mutates_printed_state() {
    let dir = service(
        r"
service: demo
custom:
  scriptable:
    showCommands: false
    hooks:
      after:package:createDeploymentArtifacts: package.rhai
",
    );
    fs::write(
        dir.path().join("package.rhai"),
        r#"host.service.artifact = host.service.service + "-" + options.stage + ".zip";"#,
    )
    .unwrap();

    let output = scriptable(dir.path())
        .args([
            "-o",
            "stage=prod",
            "--print-state",
            "run",
            "after:package:createDeploymentArtifacts",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let state: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(state["service"]["artifact"], "demo-prod.zip");
}

#[test]
fn test_legacy_configuration_warns() {
    let dir = service(
        r"
custom:
  scriptHooks:
    deploy: echo legacy
",
    );

    scriptable(dir.path())
        .args(["run", "deploy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("legacy"))
        .stderr(predicate::str::contains("deprecated"));
}

#[test]
fn test_custom_command() {
    let dir = service(
        r"
custom:
  scriptable:
    commands:
      migrate: echo migrating $SCRIPTABLE_EVENT
",
    );

    scriptable(dir.path())
        .args(["command", "migrate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("migrating migrate:command"));

    scriptable(dir.path())
        .args(["command", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No custom command named 'missing'"));
}

#[test]
fn test_strict_run() {
    let dir = service("service: demo\n");

    scriptable(dir.path())
        .args(["run", "deploy"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No hook registered for"));

    scriptable(dir.path())
        .args(["run", "--strict", "deploy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No hook registered for event 'deploy'"));
}

#[test]
fn test_list_json() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("service.json"),
        r#"{ "custom": { "scriptable": {
            "hooks": { "deploy": "echo a" },
            "commands": { "migrate": ["echo m", "migrate.rhai"] }
        } } }"#,
    )
    .unwrap();

    let output = scriptable(dir.path())
        .args(["--service", "service.json", "list", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let listing: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(listing["hooks"][0]["event"], "deploy");
    assert_eq!(listing["hooks"][1]["event"], "migrate:command");
    assert_eq!(listing["commands"][0]["usage"], "Run echo m,migrate.rhai");
}

#[test]
fn test_list_text() {
    let dir = service(
        r"
custom:
  scriptable:
    hooks:
      deploy: echo a
",
    );

    scriptable(dir.path())
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy").and(predicate::str::contains("echo a")));
}

#[test]
fn test_missing_service_file() {
    let dir = TempDir::new().unwrap();

    scriptable(dir.path())
        .args(["list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("serverless.yml"));
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for the mealboard CLI commands

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const WEEK: &str = "2024-01-01";

/// Build a mealboard command isolated in `data_dir`
fn mealboard(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mealboard").unwrap();
    cmd.env("MEALBOARD_DATA_DIR", data_dir.path().join("data"))
        .env("MEALBOARD_CONFIG", data_dir.path().join("config.toml"))
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

/// Data dir with the demo board already written
fn demo() -> TempDir {
    let data_dir = TempDir::new().unwrap();
    mealboard(&data_dir).args(["init", "--demo"]).assert().success();
    data_dir
}

/// Helper to get stdout as string
fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_show_demo_week() {
    let data_dir = demo();
    let stdout = stdout_of(mealboard(&data_dir).args(["show", "--week", WEEK]));

    insta::assert_snapshot!(stdout.trim_end(), @r###"
2024-01-01 Mon
  pizza  schedule1#meal1
  bread  schedule2#meal2
  [breakfast]  schedule3#group1
    tea  schedule3#meal3#0
    sandwich  schedule3#meal4#1
2024-01-02 Tue
  pasta  schedule4#meal5
  salad  schedule5#meal6
  [lunch]  schedule6#group2
    soup  schedule6#meal7#0
    burger  schedule6#meal8#1
2024-01-03 Wed
  -
2024-01-04 Thu
  -
2024-01-05 Fri
  -
2024-01-06 Sat
  -
2024-01-07 Sun
  -
"###);
}

#[test]
fn test_init_refuses_to_overwrite() {
    let data_dir = demo();
    mealboard(&data_dir)
        .args(["init", "--demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    mealboard(&data_dir).args(["init", "--force"]).assert().success();
    mealboard(&data_dir)
        .args(["show", "--week", WEEK])
        .assert()
        .success()
        .stdout(predicate::str::contains("pizza").not());
}

#[test]
fn test_show_requires_init() {
    let data_dir = TempDir::new().unwrap();
    mealboard(&data_dir)
        .args(["show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mealboard init"));
}

#[test]
fn test_drag_across_days_persists() {
    let data_dir = demo();
    mealboard(&data_dir)
        .args(["drag", "schedule1#meal1", "2024-01-02", "--week", WEEK])
        .assert()
        .success()
        .stdout(predicate::str::contains("Drop committed"))
        .stdout(predicate::str::contains("switch meal1 2024-01-01/- -> 2024-01-02/-"));

    let stdout = stdout_of(mealboard(&data_dir).args(["show", "--week", WEEK]));
    let day2 = stdout.split("2024-01-02 Tue").nth(1).unwrap();
    assert!(day2.contains("pizza"));
    assert!(data_dir.path().join("data").join("journal.jsonl").exists());
}

#[test]
fn test_drag_without_target_aborts() {
    let data_dir = demo();
    mealboard(&data_dir)
        .args(["drag", "schedule1#meal1", "--week", WEEK])
        .assert()
        .success()
        .stdout(predicate::str::contains("Drop aborted"));
    assert!(!data_dir.path().join("data").join("journal.jsonl").exists());
}

#[test]
fn test_dry_run_leaves_board_alone() {
    let data_dir = demo();
    let before = stdout_of(mealboard(&data_dir).args(["show", "--week", WEEK]));
    mealboard(&data_dir)
        .args(["drag", "schedule2#meal2", "schedule1#meal1", "--week", WEEK, "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));
    let after = stdout_of(mealboard(&data_dir).args(["show", "--week", WEEK]));
    assert_eq!(before, after);
}

#[test]
fn test_drag_json_report() {
    let data_dir = demo();
    let stdout = stdout_of(mealboard(&data_dir).args([
        "--json",
        "drag",
        "schedule2#meal2",
        "schedule1#meal1",
        "--week",
        WEEK,
    ]));
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["outcome"], "committed");
    assert_eq!(report["persisted"], true);
    assert_eq!(report["intents"][0]["op"], "update_order");
}

#[test]
fn test_project_into_group() {
    let data_dir = demo();
    mealboard(&data_dir)
        .args(["project", "schedule1#meal1", "schedule3#meal4#1", "--offset", "60", "--week", WEEK])
        .assert()
        .success()
        .stdout(predicate::str::contains("depth: 1"))
        .stdout(predicate::str::contains("parent: schedule3#group1"));
}

#[test]
fn test_malformed_id_is_rejected() {
    let data_dir = demo();
    mealboard(&data_dir)
        .args(["drag", "a#b#c#d", "schedule1#meal1", "--week", WEEK])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot drag"));
}

#[test]
fn test_table_switch_and_reorder() {
    let data_dir = demo();
    mealboard(&data_dir)
        .args(["table", "switch", "row-breakfast", "1", "row-lunch", "1", "--week", WEEK])
        .assert()
        .success()
        .stdout(predicate::str::contains("switch meal4 2024-01-02/row-breakfast -> 2024-01-02/row-lunch"));

    mealboard(&data_dir)
        .args(["table", "switch", "row-breakfast", "1", "row-lunch", "2", "--week", WEEK])
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));

    mealboard(&data_dir)
        .args(["table", "reorder", "row-lunch", "row-breakfast"])
        .assert()
        .success();
    let stdout = stdout_of(mealboard(&data_dir).args(["table", "show", "--week", WEEK]));
    let lunch = stdout.find("lunch").unwrap();
    let breakfast = stdout.find("breakfast").unwrap();
    assert!(lunch < breakfast);
}

#[test]
fn test_config_get_and_set() {
    let data_dir = TempDir::new().unwrap();
    mealboard(&data_dir)
        .args(["config", "indentation_width"])
        .assert()
        .success()
        .stdout("50\n");

    mealboard(&data_dir).args(["config", "week_starts_on", "sunday"]).assert().success();
    mealboard(&data_dir)
        .args(["config", "week_starts_on"])
        .assert()
        .success()
        .stdout("sunday\n");

    mealboard(&data_dir)
        .args(["config", "week_starts_on", "friday"])
        .assert()
        .failure();
}

#[test]
fn test_completions() {
    let data_dir = TempDir::new().unwrap();
    mealboard(&data_dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mealboard"));
}

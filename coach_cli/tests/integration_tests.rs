//! Integration tests for the coach_cli binary.
//!
//! These tests verify end-to-end behavior including:
//! - Plan creation and session materialization
//! - Replace-on-edit semantics
//! - Drafts and the pending-sync log
//! - CSV export and cascade delete

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("trnr"))
}

/// Weekly plan file: Monday + Wednesday over two weeks starting on a Monday
const WEEKLY_PLAN: &str = r#"
name = "Two Week Block"
description = "Base conditioning"
client = "sarah"
start_date = "2024-01-01"
end_date = "2024-01-14"
schedule = "weekly"

[weekly]
monday = "tpl_full_body"
wednesday = "tpl_upper_body"
"#;

const EDITED_PLAN: &str = r#"
name = "Two Week Block (revised)"
client = "sarah"
start_date = "2024-01-01"
end_date = "2024-01-14"
schedule = "weekly"

[weekly]
friday = "tpl_conditioning"
"#;

fn write_plan_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write plan file");
    path
}

/// Extract the plan id from `✓ Created plan <uuid>` output
fn created_plan_id(stdout: &[u8]) -> String {
    let text = String::from_utf8_lossy(stdout);
    text.lines()
        .find_map(|line| line.strip_prefix("✓ Created plan "))
        .expect("No created-plan line in output")
        .trim()
        .to_string()
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Trainer workout plan scheduler"));
}

#[test]
fn test_create_materializes_expected_sessions() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan_file = write_plan_file(temp_dir.path(), "plan.toml", WEEKLY_PLAN);

    cli()
        .arg("create")
        .arg("--file")
        .arg(&plan_file)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 sessions scheduled"));

    // 2024-01-01/08 Mondays, 2024-01-03/10 Wednesdays
    let sessions = fs::read_to_string(data_dir.join("sessions.jsonl")).unwrap();
    assert_eq!(sessions.lines().count(), 4);
    assert!(sessions.contains("2024-01-01"));
    assert!(sessions.contains("2024-01-03"));
    assert!(sessions.contains("2024-01-08"));
    assert!(sessions.contains("2024-01-10"));
    assert!(sessions.contains("tpl_full_body"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan_file = write_plan_file(temp_dir.path(), "plan.toml", WEEKLY_PLAN);

    cli()
        .arg("create")
        .arg("--file")
        .arg(&plan_file)
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 session(s)"))
        .stdout(predicate::str::contains("Dry run"));

    assert!(!data_dir.join("plans.json").exists());
    assert!(!data_dir.join("sessions.jsonl").exists());
}

#[test]
fn test_edit_replaces_sessions() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan_file = write_plan_file(temp_dir.path(), "plan.toml", WEEKLY_PLAN);
    let edited_file = write_plan_file(temp_dir.path(), "edited.toml", EDITED_PLAN);

    let output = cli()
        .arg("create")
        .arg("--file")
        .arg(&plan_file)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let plan_id = created_plan_id(&output);

    cli()
        .arg("edit")
        .arg(&plan_id)
        .arg("--file")
        .arg(&edited_file)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("previous schedule replaced"));

    // Only the Friday sessions remain: 2024-01-05 and 2024-01-12
    let sessions = fs::read_to_string(data_dir.join("sessions.jsonl")).unwrap();
    assert_eq!(sessions.lines().count(), 2);
    assert!(!sessions.contains("tpl_full_body"));
    assert!(!sessions.contains("tpl_upper_body"));
    assert!(sessions.contains("tpl_conditioning"));
}

#[test]
fn test_list_and_show_flow() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan_file = write_plan_file(temp_dir.path(), "plan.toml", WEEKLY_PLAN);

    let output = cli()
        .arg("create")
        .arg("--file")
        .arg(&plan_file)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let plan_id = created_plan_id(&output);

    cli()
        .arg("list")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Two Week Block"))
        .stdout(predicate::str::contains("draft"));

    cli()
        .arg("list")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--status")
        .arg("active")
        .assert()
        .success()
        .stdout(predicate::str::contains("No plans found"));

    cli()
        .arg("show")
        .arg(&plan_id)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Two Week Block"))
        .stdout(predicate::str::contains("Workouts: 2/week"))
        .stdout(predicate::str::contains("Full Body Strength"));
}

#[test]
fn test_set_status_updates_list_filter() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan_file = write_plan_file(temp_dir.path(), "plan.toml", WEEKLY_PLAN);

    let output = cli()
        .arg("create")
        .arg("--file")
        .arg(&plan_file)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let plan_id = created_plan_id(&output);

    cli()
        .arg("set-status")
        .arg(&plan_id)
        .arg("active")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("is now active"));

    cli()
        .arg("list")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--status")
        .arg("active")
        .assert()
        .success()
        .stdout(predicate::str::contains(&plan_id));
}

#[test]
fn test_export_writes_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan_file = write_plan_file(temp_dir.path(), "plan.toml", WEEKLY_PLAN);
    let csv_path = temp_dir.path().join("schedule.csv");

    let output = cli()
        .arg("create")
        .arg("--file")
        .arg(&plan_file)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let plan_id = created_plan_id(&output);

    cli()
        .arg("export")
        .arg(&plan_id)
        .arg("--out")
        .arg(&csv_path)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 4 sessions"));

    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("plan_id,plan_name,scheduled_date"));
    assert_eq!(csv.lines().count(), 5); // header + 4 rows
}

#[test]
fn test_delete_cascades_and_records_sync() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan_file = write_plan_file(temp_dir.path(), "plan.toml", WEEKLY_PLAN);

    let output = cli()
        .arg("create")
        .arg("--file")
        .arg(&plan_file)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let plan_id = created_plan_id(&output);

    cli()
        .arg("delete")
        .arg(&plan_id)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted plan"));

    let sessions = fs::read_to_string(data_dir.join("sessions.jsonl")).unwrap();
    assert!(sessions.trim().is_empty());

    cli()
        .arg("sync")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains(&plan_id))
        .stdout(predicate::str::contains("Delete"));
}

#[test]
fn test_draft_roundtrip() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan_file = write_plan_file(temp_dir.path(), "plan.toml", WEEKLY_PLAN);

    cli()
        .arg("create")
        .arg("--file")
        .arg(&plan_file)
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--draft")
        .arg("winter")
        .assert()
        .success()
        .stdout(predicate::str::contains("Draft 'winter' saved"));

    // Nothing committed yet
    assert!(!data_dir.join("plans.json").exists());

    cli()
        .arg("drafts")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("winter"));

    cli()
        .arg("create")
        .arg("--from-draft")
        .arg("winter")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 sessions scheduled"));

    cli()
        .arg("drafts")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--rm")
        .arg("winter")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed draft"));
}

#[test]
fn test_invalid_date_range_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan_file = write_plan_file(
        temp_dir.path(),
        "bad.toml",
        r#"
name = "Backwards"
client = "sarah"
start_date = "2024-02-01"
end_date = "2024-01-01"
schedule = "weekly"

[weekly]
monday = "tpl_full_body"
"#,
    );

    cli()
        .arg("create")
        .arg("--file")
        .arg(&plan_file)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure();

    assert!(!data_dir.join("plans.json").exists());
}

#[test]
fn test_all_rest_schedule_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan_file = write_plan_file(
        temp_dir.path(),
        "rest.toml",
        r#"
name = "All Rest"
client = "sarah"
start_date = "2024-01-01"
end_date = "2024-02-01"
schedule = "weekly"

[weekly]
"#,
    );

    cli()
        .arg("create")
        .arg("--file")
        .arg(&plan_file)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure();
}

#[test]
fn test_mismatched_schedule_table_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan_file = write_plan_file(
        temp_dir.path(),
        "mismatch.toml",
        r#"
name = "Mismatch"
client = "sarah"
start_date = "2024-01-01"
end_date = "2024-02-01"
schedule = "monthly"

[weekly]
monday = "tpl_full_body"
"#,
    );

    cli()
        .arg("create")
        .arg("--file")
        .arg(&plan_file)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure();
}

#[test]
fn test_session_schedule_creates_dateless_sessions() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let plan_file = write_plan_file(
        temp_dir.path(),
        "sessions.toml",
        r#"
name = "Ten Pack"
client = "sarah"
start_date = "2024-01-01"
end_date = "2024-06-30"
schedule = "session"

[[session]]
template = "tpl_full_body"

[[session]]
template = "tpl_conditioning"

[[session]]
key = "rest"
"#,
    );

    cli()
        .arg("create")
        .arg("--file")
        .arg(&plan_file)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 sessions scheduled"));

    let sessions = fs::read_to_string(data_dir.join("sessions.jsonl")).unwrap();
    assert_eq!(sessions.lines().count(), 2);
    assert!(sessions.contains("\"scheduled_date\":null"));
}

#[test]
fn test_templates_command() {
    let temp_dir = setup_test_dir();
    cli()
        .arg("templates")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("tpl_full_body"))
        .stdout(predicate::str::contains("Full Body Strength"));
}

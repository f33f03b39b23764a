//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. Each test
//! points HOME at its own temp directory so the database and config are
//! isolated from the developer's data and from other tests.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command against the given home directory and return output.
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "pulsecor-cli", "--"])
        .args(args)
        .env("HOME", home)
        .env("PULSECOR_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn checkin_start_greets_and_offers_replies() {
    let home = TempDir::new().unwrap();
    let (stdout, stderr, code) = run_cli(home.path(), &["checkin", "start"]);
    assert_eq!(code, 0, "checkin start failed: {stderr}");
    assert!(stdout.contains("Ready to check in"));
    assert!(stdout.contains("Yes, let's do it!"));
}

#[test]
fn full_check_in_reports_a_streak() {
    let home = TempDir::new().unwrap();
    let (_, _, code) = run_cli(home.path(), &["checkin", "start"]);
    assert_eq!(code, 0);

    for reply in [
        "Yes, let's do it!",
        "Refreshed",
        "7-8 hours",
        "5-6 glasses",
        "Calm",
        "High",
        "Medium",
    ] {
        let (_, stderr, code) = run_cli(home.path(), &["checkin", "reply", reply]);
        assert_eq!(code, 0, "reply '{reply}' failed: {stderr}");
    }

    let (stdout, _, code) = run_cli(home.path(), &["checkin", "status"]);
    assert_eq!(code, 0);
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["checked_in_today"], true);
    assert_eq!(status["current_streak"], 1);
    assert_eq!(status["conversation_active"], false);
}

#[test]
fn declining_the_greeting_leaves_no_check_in() {
    let home = TempDir::new().unwrap();
    run_cli(home.path(), &["checkin", "start"]);
    let (stdout, _, code) = run_cli(home.path(), &["checkin", "reply", "Not right now"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No problem"));

    let (stdout, _, _) = run_cli(home.path(), &["checkin", "status"]);
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["checked_in_today"], false);
}

#[test]
fn replies_lists_the_current_quick_replies() {
    let home = TempDir::new().unwrap();
    run_cli(home.path(), &["checkin", "start"]);
    run_cli(home.path(), &["checkin", "reply", "yes"]);

    let (stdout, _, code) = run_cli(home.path(), &["checkin", "replies"]);
    assert_eq!(code, 0);
    let replies: Vec<String> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(replies, vec!["Refreshed", "Okay", "Groggy"]);
}

#[test]
fn calendar_show_prints_month_groups() {
    let home = TempDir::new().unwrap();
    let (stdout, stderr, code) = run_cli(home.path(), &["calendar", "show", "--months-back", "1"]);
    assert_eq!(code, 0, "calendar show failed: {stderr}");
    let view: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let months = view["months"].as_array().unwrap();
    assert!(months.len() >= 3, "expected at least prev + current + 2 future months");
    for week in months[0]["weeks"].as_array().unwrap() {
        assert_eq!(week.as_array().unwrap().len(), 7);
    }
}

#[test]
fn streak_show_and_repair_agree_on_fresh_data() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["streak", "show"]);
    assert_eq!(code, 0);
    let view: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(view["current_streak"], 0);

    let (stdout, _, code) = run_cli(home.path(), &["streak", "repair"]);
    assert_eq!(code, 0);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["current_streak"], 0);
    assert_eq!(report["check_in_days"], 0);
    assert_eq!(report["changed"], false);
}

#[test]
fn med_lifecycle_add_log_remove() {
    let home = TempDir::new().unwrap();
    let (stdout, stderr, code) = run_cli(
        home.path(),
        &[
            "med", "add", "Vitamin D", "--dosage", "1000 IU", "--time", "08:00",
        ],
    );
    assert_eq!(code, 0, "med add failed: {stderr}");
    assert!(stdout.contains("Medication created"));

    let (stdout, _, code) = run_cli(home.path(), &["med", "list"]);
    assert_eq!(code, 0);
    let meds: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let med_id = meds[0]["id"].as_i64().unwrap();
    assert_eq!(meds[0]["name"], "Vitamin D");

    let (stdout, _, code) = run_cli(home.path(), &["med", "reminders"]);
    assert_eq!(code, 0);
    let reminders: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(reminders[0]["times"][0], "08:00");

    let id_arg = med_id.to_string();
    let (_, _, code) = run_cli(home.path(), &["med", "log", &id_arg, "--status", "taken"]);
    assert_eq!(code, 0);

    let (_, _, code) = run_cli(home.path(), &["med", "remove", &id_arg]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["med", "list"]);
    let meds: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(meds.as_array().unwrap().len(), 0);
}

#[test]
fn config_reminder_time_is_validated_and_persisted() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "show"]);
    assert_eq!(code, 0);
    let cfg: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(cfg["reminders"]["daily_check_in_time"], "20:00");

    let (_, _, code) = run_cli(home.path(), &["config", "set-reminder", "07:30"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["config", "show"]);
    let cfg: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(cfg["reminders"]["daily_check_in_time"], "07:30");

    let (_, stderr, code) = run_cli(home.path(), &["config", "set-reminder", "25:99"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("not a valid"));
}

#[test]
fn user_set_name_round_trips() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["user", "set-name", "Maya"]);
    assert_eq!(code, 0, "set-name failed: {stderr}");

    let (stdout, _, code) = run_cli(home.path(), &["user", "show"]);
    assert_eq!(code, 0);
    let user: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(user["name"], "Maya");
}

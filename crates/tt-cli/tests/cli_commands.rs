//! Integration tests for the tt CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BRONCHIOLITIS: &str = r#"{
    "ScenarioName": "Bronchiolitis",
    "Elements": [
        { "Category": "Opening",
          "Answer": ["TransferCenter", "Learner", "You have a call on line two."] },
        { "Category": "TransferCenter",
          "LearnerResponse": ["Learner", "TransferCenter", "What's our bed status?"],
          "Matches": ["bed"],
          "Answer": ["TransferCenter", "Learner", "Two PICU beds open."] },
        { "Category": "TransferCenter",
          "LearnerResponse": ["Learner", "TransferCenter", "Please connect me"],
          "Matches": ["connect"],
          "Answer": ["TransferCenter", "Learner", "Connecting you now."],
          "Function": ["Connect"],
          "Child": [
            { "Category": "ElicitedHistory",
              "LearnerResponse": ["Learner", "OSH", "How old is the patient?"],
              "Matches": ["age", "old"],
              "Answer": ["OSH", "Learner", "Four months."],
              "Score": 5,
              "Child": [
                { "Category": "Disposition",
                  "LearnerResponse": ["Learner", "OSH", "We'll accept to the PICU"],
                  "Matches": ["accept"],
                  "Answer": ["OSH", "Learner", "Thank you."],
                  "Score": 8,
                  "Function": ["EndScenario"] }
              ] },
            { "Category": "VitalSigns",
              "Answer": ["Monitor", "Learner", "{\"HR\": 170, \"SpO2\": \"88%\"}"] }
          ] }
    ],
    "TimingPointsMap": [
        { "timeSeconds": 300, "points": 20 },
        { "timeSeconds": 600, "points": 10 }
    ]
}"#;

const CROUP: &str = r#"{
    "ScenarioName": "Croup",
    "Elements": [
        { "Category": "Opening", "Answer": ["TransferCenter", "Learner", "Croup call."] }
    ]
}"#;

/// A temp directory with two good scenarios and a config document.
fn test_scenarios() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Scenario1.json"), BRONCHIOLITIS).unwrap();
    fs::write(dir.path().join("Scenario2.json"), CROUP).unwrap();
    fs::write(
        dir.path().join("ScenariosConfig.json"),
        r#"{ "description": "Pediatric transfers", "scenarioCount": 2,
             "scenarioFiles": ["Scenario1.json", "Scenario2.json"] }"#,
    )
    .unwrap();
    dir
}

fn tt() -> Command {
    Command::cargo_bin("tt").unwrap()
}

fn dir_arg(dir: &TempDir) -> String {
    dir.path().to_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[test]
fn list_shows_scenarios() {
    let dir = test_scenarios();
    tt().args(["list", "-d", &dir_arg(&dir)])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Bronchiolitis")
                .and(predicate::str::contains("Croup"))
                .and(predicate::str::contains("Pediatric transfers"))
                .and(predicate::str::contains("2 scenarios")),
        );
}

#[test]
fn list_json() {
    let dir = test_scenarios();
    let output = tt()
        .args(["list", "--json", "-d", &dir_arg(&dir)])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["id"], 1);
    assert_eq!(rows[0]["name"], "Bronchiolitis");
    assert_eq!(rows[0]["timingMax"], 20);
    assert_eq!(rows[1]["elements"], 1);
}

#[test]
fn list_empty_directory() {
    let dir = TempDir::new().unwrap();
    tt().args(["list", "-d", &dir_arg(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("No scenarios found"));
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

#[test]
fn show_prints_tree_and_timing() {
    let dir = test_scenarios();
    tt().args(["show", "1", "-d", &dir_arg(&dir)])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Please connect me")
                .and(predicate::str::contains("How old is the patient?"))
                .and(predicate::str::contains("EndScenario"))
                .and(predicate::str::contains("300")),
        );
}

#[test]
fn show_unknown_scenario_fails() {
    let dir = test_scenarios();
    tt().args(["show", "9", "-d", &dir_arg(&dir)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scenario 9 not found"));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_passes_for_good_scenarios() {
    let dir = test_scenarios();
    tt().args(["check", "-d", &dir_arg(&dir)])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("All checks passed")
                .and(predicate::str::contains("2 scenarios")),
        );
}

#[test]
fn check_fails_on_malformed_file() {
    let dir = test_scenarios();
    fs::write(dir.path().join("Scenario3.json"), "{ not json").unwrap();
    tt().args(["check", "-d", &dir_arg(&dir)])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("Scenario3.json")
                .and(predicate::str::contains("1 file could not be loaded")),
        );
}

#[test]
fn check_reports_unknown_triggers() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("Scenario4.json"),
        r#"{ "ScenarioName": "Odd",
             "Elements": [ { "Category": "Opening",
                             "Answer": ["TransferCenter", "Learner", "Hi."],
                             "Function": ["Dance"] } ] }"#,
    )
    .unwrap();
    tt().args(["check", "-d", &dir_arg(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 warning"))
        .stderr(predicate::str::contains("Dance"));
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_scripted_session_writes_record() {
    let dir = test_scenarios();
    let records = TempDir::new().unwrap();
    tt().args([
        "play",
        "1",
        "-d",
        &dir_arg(&dir),
        "--learner",
        "jd42",
        "--records",
        &dir_arg(&records),
    ])
    .write_stdin(
        "What's our bed status?\n\
         Please connect me\n\
         topic ElicitedHistory\n\
         ? how old\n\
         1\n\
         vitals\n\
         We'll accept to the PICU\n\
         quit\n",
    )
    .assert()
    .success()
    .stdout(
        predicate::str::contains("You have a call on line two.")
            .and(predicate::str::contains("Connecting you now."))
            .and(predicate::str::contains("1. How old is the patient?"))
            .and(predicate::str::contains("Four months."))
            .and(predicate::str::contains("170"))
            .and(predicate::str::contains("Session record written")),
    );

    let files: Vec<_> = fs::read_dir(records.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("session_jd42_"));

    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(record["netId"], "jd42");
    let summary = &record["scenarioSummaries"][0];
    assert_eq!(summary["scenarioName"], "Bronchiolitis");
    assert_eq!(summary["ElicitedHistoryEarned"], 5);
    assert_eq!(summary["ActionsEarned"], 8);
    assert_eq!(summary["BedStatusAsked"], "AskedBeforeConnected");
}

#[test]
fn play_without_records_dir_prints_record() {
    let dir = test_scenarios();
    tt().args(["play", "2", "-d", &dir_arg(&dir), "--learner", "tester"])
        .write_stdin("end\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Croup call.")
                .and(predicate::str::contains("\"netId\": \"tester\""))
                .and(predicate::str::contains("\"scenarioName\": \"Croup\"")),
        );
}

#[test]
fn play_unmatched_input_gets_fallback() {
    let dir = test_scenarios();
    tt().args(["play", "1", "-d", &dir_arg(&dir)])
        .write_stdin("How old is the patient?\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("That's something you should ask the OSH"));
}

#[test]
fn play_reports_input_after_scenario_ended() {
    let dir = test_scenarios();
    tt().args(["play", "2", "-d", &dir_arg(&dir)])
        .write_stdin("end\nhello\nquit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("no scenario is active"));
}

#[test]
fn play_reads_config_file() {
    let dir = test_scenarios();
    let config_dir = TempDir::new().unwrap();
    let config = config_dir.path().join("tt.toml");
    fs::write(&config, "learner_id = \"fromfile\"\ndifficulty = \"hard\"\n").unwrap();
    tt().args(["--config", config.to_str().unwrap(), "play", "2", "-d", &dir_arg(&dir)])
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"netId\": \"fromfile\"")
                .and(predicate::str::contains("\"difficulty\": \"hard\"")),
        );
}

#[test]
fn play_rejects_path_like_learner_id() {
    let dir = test_scenarios();
    let records = TempDir::new().unwrap();
    tt().args([
        "play",
        "2",
        "-d",
        &dir_arg(&dir),
        "--learner",
        "../escape",
        "--records",
        &dir_arg(&records),
    ])
    .write_stdin("quit\n")
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid learner id"));
    assert_eq!(fs::read_dir(records.path()).unwrap().count(), 0);
}

#[test]
fn play_exports_text_report() {
    let dir = test_scenarios();
    let records = TempDir::new().unwrap();
    tt().args([
        "play",
        "1",
        "-d",
        &dir_arg(&dir),
        "--learner",
        "jd42",
        "--records",
        &dir_arg(&records),
        "--export",
        "text",
    ])
    .write_stdin("Please connect me\nHow old is the patient?\nend\nquit\n")
    .assert()
    .success()
    .stdout(
        predicate::str::contains("Session record written")
            .and(predicate::str::contains("Session "))
            .and(predicate::str::contains("1. Bronchiolitis"))
            .and(predicate::str::contains("Questions: 5  Decision: 0"))
            .and(predicate::str::contains("\"netId\"").not()),
    );
    assert_eq!(fs::read_dir(records.path()).unwrap().count(), 1);
}

#[test]
fn play_rejects_unknown_export_format() {
    let dir = test_scenarios();
    tt().args(["play", "2", "-d", &dir_arg(&dir), "--export", "xml"])
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported export format"));
}

#[test]
fn play_unknown_scenario_fails() {
    let dir = test_scenarios();
    tt().args(["play", "7", "-d", &dir_arg(&dir)])
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("scenario 7 not found"));
}

#![warn(clippy::pedantic)]

use assert_cmd::Command;
use kjoint::Sheet;
use predicates::prelude::*;

fn kjoint() -> Command {
    Command::cargo_bin("kjoint").expect("binary is built")
}

#[test]
fn prints_report_for_reference_set() {
    kjoint()
        .assert()
        .success()
        .stdout(predicate::str::contains("K-joint truss design"))
        .stdout(predicate::str::contains("Fatigue life:"))
        .stdout(predicate::str::contains("Pin diameters:"));
}

#[test]
fn json_lists_export_records() {
    kjoint()
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["))
        .stdout(predicate::str::contains("\"label\": \"PEAKFORCE\""))
        .stdout(predicate::str::contains("\"label\": \"LIFE\""));
}

#[test]
fn writes_new_worksheet() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("design.json");

    kjoint()
        .arg("--sheet")
        .arg(&path)
        .arg("--new-sheet")
        .assert()
        .success();

    let sheet = Sheet::load(&path).expect("worksheet saved");
    assert_eq!(sheet.rows[0].label.as_deref(), Some("PEAKFORCE"));
    assert_eq!(sheet.rows[0].values.len(), 3);
}

#[test]
fn missing_parameter_file_fails() {
    let dir = tempfile::tempdir().expect("temporary directory");
    kjoint()
        .arg("--params")
        .arg(dir.path().join("absent.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn incomplete_parameter_file_names_missing_quantity() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("params.json");
    std::fs::write(&path, r#"{ "A": { "unit": "mm", "value": 1200 } }"#).expect("write params");

    kjoint()
        .arg("--params")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("MissingQuantity(\"B\")"));
}

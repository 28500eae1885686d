#![forbid(unsafe_code)]
#![cfg(feature = "serde")]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const CONFIG: &str = r#"{
  "shifts": [{"code": "M", "hours_per_shift": 8.0, "min_persons": 1, "max_persons": 1}],
  "max_hours_year_employee": 10000.0,
  "max_hours_week_employee": 1000.0
}"#;

fn write_inputs(dir: &Path, config: &str) {
    fs::write(dir.join("config.json"), config).unwrap();
    fs::write(dir.join("employees.csv"), "id,capacity,name\nE1,1.0,Alice\nE2,1.0,Bob\n").unwrap();
    fs::write(dir.join("vacations.csv"), "employee,dates\nE2,2025-01-07\n").unwrap();
}

#[allow(deprecated)]
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("roulement-cli").unwrap();
    cmd.current_dir(dir);
    cmd
}

fn plan(dir: &Path) {
    cli(dir)
        .args([
            "plan",
            "--config",
            "config.json",
            "--employees",
            "employees.csv",
            "--vacations",
            "vacations.csv",
            "--start",
            "2025-01-06",
            "--days",
            "3",
            "--out-csv",
            "grid.csv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Planned 3 day(s) for 2 employee(s)"));
}

#[test]
fn plan_then_inspect() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path(), CONFIG);
    plan(dir.path());

    assert!(dir.path().join("plan.json").exists());
    let grid = fs::read_to_string(dir.path().join("grid.csv")).unwrap();
    assert!(grid.starts_with("date,E1,E2\n"));
    assert!(grid.contains("2025-01-07,M,V"));

    cli(dir.path())
        .args(["show", "--employee", "E2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-01-07 | V"));

    cli(dir.path())
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("E1 | 3 shift(s)"));

    cli(dir.path())
        .args(["summary", "--monthly", "--monthly-csv", "monthly.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-01 | 3 shift(s) | 24.00 h | 0 understaffed day(s)"));
    let monthly = fs::read_to_string(dir.path().join("monthly.csv")).unwrap();
    assert!(monthly.ends_with("2025-01,Total,3,24.00\n"));

    cli(dir.path())
        .arg("check")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn check_reports_understaffing_with_exit_code_two() {
    let dir = tempdir().unwrap();
    let config = CONFIG
        .replace("\"min_persons\": 1", "\"min_persons\": 2")
        .replace("\"max_persons\": 1", "\"max_persons\": 2");
    write_inputs(dir.path(), &config);
    plan(dir.path());

    cli(dir.path())
        .args(["check", "--report", "gaps.csv"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("understaffed"));

    let gaps = fs::read_to_string(dir.path().join("gaps.csv")).unwrap();
    assert!(gaps.starts_with("date,shift,assigned,min_persons\n"));
    assert!(gaps.contains("2025-01-07,M,1,2"));
}

#[test]
fn missing_plan_file_fails() {
    let dir = tempdir().unwrap();
    cli(dir.path())
        .args(["--plan", "nowhere.json", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere.json"));
}

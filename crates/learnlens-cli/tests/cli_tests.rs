//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn learnlens() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("learnlens").unwrap();
    cmd.env_remove("LEARNLENS_DATA_DIR")
        .env_remove("LEARNLENS_OUTPUT_DIR");
    cmd
}

/// A temp directory with `learnlens init` already run in it.
fn initialized() -> TempDir {
    let dir = TempDir::new().unwrap();
    learnlens()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    dir
}

#[test]
fn help_lists_commands() {
    learnlens()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("student"))
        .stdout(predicate::str::contains("class"))
        .stdout(predicate::str::contains("batch"));
}

#[test]
fn version_flag() {
    learnlens()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("learnlens"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    learnlens()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created learnlens.toml"))
        .stdout(predicate::str::contains("Created data/assessments.csv"));

    assert!(dir.path().join("learnlens.toml").exists());
    assert!(dir.path().join("data/students.csv").exists());
    assert!(dir.path().join("data/study_sessions.csv").exists());
}

#[test]
fn init_skips_existing() {
    let dir = initialized();

    learnlens()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_sample_data() {
    let dir = initialized();

    learnlens()
        .current_dir(dir.path())
        .args(["validate", "--data", "data"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 students"))
        .stdout(predicate::str::contains("Data set valid."));
}

#[test]
fn validate_reports_warnings() {
    let dir = initialized();
    let assessments = dir.path().join("data/assessments.csv");
    let mut content = std::fs::read_to_string(&assessments).unwrap();
    content.push_str("STU999,History,Civics,2025-10-01 09:00:00,120.0,100,0,1,Easy\n");
    std::fs::write(&assessments, content).unwrap();

    learnlens()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("references unknown student"))
        .stdout(predicate::str::contains("outside [0, 100]"))
        .stdout(predicate::str::contains("3 warning(s) found."));
}

#[test]
fn student_report_writes_all_formats() {
    let dir = initialized();

    learnlens()
        .current_dir(dir.path())
        .args(["student", "--id", "STU001", "--format", "all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Strong Improvement"));

    let out = dir.path().join("learnlens-reports");
    for ext in ["json", "html", "md"] {
        assert!(out.join(format!("STU001_report.{ext}")).exists(), "{ext}");
    }

    let json = std::fs::read_to_string(out.join("STU001_report.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["student_id"], "STU001");
    assert_eq!(
        value["performance_summary"]["improvement_trend"],
        "Strong Improvement"
    );
    assert_eq!(value["performance_summary"]["best_subject"], "Science");
}

#[test]
fn report_writes_are_logged() {
    let dir = initialized();

    learnlens()
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(["student", "--id", "STU003", "--format", "md"])
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote"))
        .stderr(predicate::str::contains("STU003_report.md"));
}

#[test]
fn student_with_weak_habits_gets_recommendations() {
    let dir = initialized();

    learnlens()
        .current_dir(dir.path())
        .args(["student", "--id", "STU002", "--output", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Focus on improving"))
        .stdout(predicate::str::contains("completion rate (currently 33.3%)"))
        .stdout(predicate::str::contains("Consider spending more time"));

    assert!(dir.path().join("out/STU002_report.json").exists());
}

#[test]
fn unknown_student_fails() {
    let dir = initialized();

    learnlens()
        .current_dir(dir.path())
        .args(["student", "--id", "STU004"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "no data available for student STU004",
        ));
}

#[test]
fn class_report() {
    let dir = initialized();

    learnlens()
        .current_dir(dir.path())
        .args(["class", "--format", "json,md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 students, 21 assessments"));

    let out = dir.path().join("learnlens-reports");
    let md = std::fs::read_to_string(out.join("class_insights.md")).unwrap();
    assert!(md.contains("# Class-Level Insights"));

    let json = std::fs::read_to_string(out.join("class_insights.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["top_performers"][0]["student_id"], "STU003");
    assert_eq!(value["engagement_metrics"]["total_sessions"], 10);
}

#[test]
fn batch_records_students_without_data() {
    let dir = initialized();

    learnlens()
        .current_dir(dir.path())
        .args(["batch", "--parallelism", "2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("SKIPPED: STU004"));

    let out = dir.path().join("learnlens-reports");
    let batch = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("batch-") && n.ends_with(".json"))
        })
        .expect("batch report written");
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(batch).unwrap()).unwrap();
    let students = value["students"].as_array().unwrap();
    assert_eq!(students.len(), 4);
    assert_eq!(students[3]["status"], "failed");
    assert_eq!(students[0]["status"], "ok");
}

#[test]
fn unknown_format_fails() {
    let dir = initialized();

    learnlens()
        .current_dir(dir.path())
        .args(["class", "--format", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn missing_data_dir_fails() {
    let dir = TempDir::new().unwrap();

    learnlens()
        .current_dir(dir.path())
        .args(["class", "--data", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("data directory not found"));
}

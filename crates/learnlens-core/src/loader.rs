//! Dataset loading and validation.
//!
//! Reads the students / assessments / study_sessions tables from a directory
//! of CSV files (or JSON record arrays) and reports schema violations the
//! analyzer assumes never happen.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::model::{Dataset, MAX_SCORE};

/// Base names of the three tables.
pub const STUDENTS_TABLE: &str = "students";
pub const ASSESSMENTS_TABLE: &str = "assessments";
pub const SESSIONS_TABLE: &str = "study_sessions";

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a timestamp in any of the accepted layouts.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_end_matches('Z');
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Serde adapter accepting space- or `T`-separated timestamps and bare dates.
pub fn flexible_datetime<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolLike {
    Bool(bool),
    Text(String),
}

/// Serde adapter accepting JSON booleans and `true`/`True`/`1`-style text.
pub fn flexible_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match BoolLike::deserialize(deserializer)? {
        BoolLike::Bool(b) => Ok(b),
        BoolLike::Text(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(serde::de::Error::custom(format!("invalid boolean: {other}"))),
        },
    }
}

/// Locate a table file, preferring CSV over JSON.
fn table_path(dir: &Path, table: &str) -> Result<PathBuf> {
    for ext in ["csv", "json"] {
        let candidate = dir.join(format!("{table}.{ext}"));
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    anyhow::bail!(
        "missing table '{table}' in {} (expected {table}.csv or {table}.json)",
        dir.display()
    )
}

/// Read one table from a CSV or JSON file.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()));
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut rows = Vec::new();
    for (i, row) in reader.deserialize::<T>().enumerate() {
        let row = row.with_context(|| format!("{}: bad record {}", path.display(), i + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Load all three tables from `dir`.
pub fn load_dataset(dir: &Path) -> Result<Dataset> {
    anyhow::ensure!(dir.is_dir(), "data directory not found: {}", dir.display());

    let students = read_table(&table_path(dir, STUDENTS_TABLE)?)?;
    let assessments = read_table(&table_path(dir, ASSESSMENTS_TABLE)?)?;
    let sessions = read_table(&table_path(dir, SESSIONS_TABLE)?)?;
    let dataset = Dataset::new(students, assessments, sessions);

    tracing::info!(
        students = dataset.students.len(),
        assessments = dataset.assessments.len(),
        sessions = dataset.sessions.len(),
        "loaded dataset from {}",
        dir.display()
    );
    Ok(dataset)
}

/// A validation warning about a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    /// Table the offending record lives in.
    pub table: &'static str,
    /// Zero-based record index within the table.
    pub row: usize,
    pub student_id: Option<String>,
    pub message: String,
}

/// Check a dataset for schema violations.
pub fn validate_dataset(dataset: &Dataset) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut known: HashSet<&str> = HashSet::new();

    for (row, student) in dataset.students.iter().enumerate() {
        if !known.insert(student.student_id.as_str()) {
            warnings.push(ValidationWarning {
                table: STUDENTS_TABLE,
                row,
                student_id: Some(student.student_id.clone()),
                message: "duplicate student id".into(),
            });
        }
    }

    for (row, a) in dataset.assessments.iter().enumerate() {
        let mut warn = |message: String| {
            warnings.push(ValidationWarning {
                table: ASSESSMENTS_TABLE,
                row,
                student_id: Some(a.student_id.clone()),
                message,
            })
        };
        if !known.contains(a.student_id.as_str()) {
            warn("references unknown student".into());
        }
        if !(0.0..=MAX_SCORE).contains(&a.score) {
            warn(format!("score {} outside [0, {MAX_SCORE}]", a.score));
        }
        if a.time_spent_minutes == 0 {
            warn("time_spent_minutes must be positive".into());
        }
        if a.attempts == 0 {
            warn("attempts must be positive".into());
        }
        if a.subject.trim().is_empty() || a.topic.trim().is_empty() {
            warn("empty subject or topic".into());
        }
    }

    for (row, s) in dataset.sessions.iter().enumerate() {
        if !known.contains(s.student_id.as_str()) {
            warnings.push(ValidationWarning {
                table: SESSIONS_TABLE,
                row,
                student_id: Some(s.student_id.clone()),
                message: "references unknown student".into(),
            });
        }
    }

    warnings
}

//! Analyzer error types.
//!
//! Degraded-but-valid outcomes (short histories, empty session tables) are
//! represented as data in the reports. Only conditions that make a report
//! meaningless are errors.

use thiserror::Error;

/// Errors returned by per-student report requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsightError {
    /// The requested student has zero assessment records.
    #[error("no data available for student {student_id}")]
    NoDataForStudent { student_id: String },
}

impl InsightError {
    /// The student the failed request was for.
    pub fn student_id(&self) -> &str {
        match self {
            InsightError::NoDataForStudent { student_id } => student_id,
        }
    }
}

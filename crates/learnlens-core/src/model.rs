//! Core data model types for learnlens.
//!
//! The three base tables (students, assessments, study sessions) and the
//! fixed label vocabularies that derived reports are expressed in.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::loader::{flexible_bool, flexible_datetime};

/// A student profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier (e.g. "STU001").
    pub student_id: String,
    /// Display name.
    pub name: String,
    /// Grade level (9-12 in the sample data).
    pub grade_level: u8,
    /// Latent ability used by data generators. Not read by the analyzer.
    #[serde(default)]
    pub base_ability: Option<f64>,
    /// Latent learning rate used by data generators.
    #[serde(default)]
    pub learning_rate: Option<f64>,
    /// Latent engagement level used by data generators.
    #[serde(default)]
    pub engagement_level: Option<f64>,
    /// Self-reported weekly study hours.
    #[serde(default)]
    pub study_hours_per_week: Option<u32>,
}

/// A single scored assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub student_id: String,
    pub subject: String,
    pub topic: String,
    #[serde(deserialize_with = "flexible_datetime")]
    pub assessment_date: NaiveDateTime,
    /// Score in `[0, 100]`.
    pub score: f64,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
    pub time_spent_minutes: u32,
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    pub difficulty_level: Difficulty,
}

fn default_max_score() -> f64 {
    MAX_SCORE
}

fn default_attempts() -> u32 {
    1
}

/// The fixed maximum score of every assessment.
pub const MAX_SCORE: f64 = 100.0;

/// A logged study session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub student_id: String,
    #[serde(deserialize_with = "flexible_datetime")]
    pub session_date: NaiveDateTime,
    pub subject: String,
    pub duration_minutes: u32,
    #[serde(deserialize_with = "flexible_bool")]
    pub completed: bool,
}

/// A read-only snapshot of the three base tables.
///
/// Analysis borrows a `Dataset` and never mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub assessments: Vec<Assessment>,
    #[serde(default)]
    pub sessions: Vec<StudySession>,
}

impl Dataset {
    pub fn new(
        students: Vec<Student>,
        assessments: Vec<Assessment>,
        sessions: Vec<StudySession>,
    ) -> Self {
        Self {
            students,
            assessments,
            sessions,
        }
    }

    /// Assessments belonging to one student, in table order.
    pub fn assessments_for<'a>(
        &'a self,
        student_id: &'a str,
    ) -> impl Iterator<Item = &'a Assessment> + 'a {
        self.assessments
            .iter()
            .filter(move |a| a.student_id == student_id)
    }

    /// Study sessions belonging to one student, in table order.
    pub fn sessions_for<'a>(
        &'a self,
        student_id: &'a str,
    ) -> impl Iterator<Item = &'a StudySession> + 'a {
        self.sessions
            .iter()
            .filter(move |s| s.student_id == student_id)
    }

    /// Student ids in table order.
    pub fn student_ids(&self) -> Vec<String> {
        self.students.iter().map(|s| s.student_id.clone()).collect()
    }
}

/// Assessment difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Qualitative direction of a score series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendLabel {
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
    #[serde(rename = "Strong Improvement")]
    StrongImprovement,
    #[serde(rename = "Moderate Improvement")]
    ModerateImprovement,
    #[serde(rename = "Stable")]
    Stable,
    #[serde(rename = "Slight Decline")]
    SlightDecline,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
}

impl TrendLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendLabel::InsufficientData => "Insufficient Data",
            TrendLabel::StrongImprovement => "Strong Improvement",
            TrendLabel::ModerateImprovement => "Moderate Improvement",
            TrendLabel::Stable => "Stable",
            TrendLabel::SlightDecline => "Slight Decline",
            TrendLabel::NeedsAttention => "Needs Attention",
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Insufficient Data" => Ok(TrendLabel::InsufficientData),
            "Strong Improvement" => Ok(TrendLabel::StrongImprovement),
            "Moderate Improvement" => Ok(TrendLabel::ModerateImprovement),
            "Stable" => Ok(TrendLabel::Stable),
            "Slight Decline" => Ok(TrendLabel::SlightDecline),
            "Needs Attention" => Ok(TrendLabel::NeedsAttention),
            other => Err(format!("unknown trend label: {other}")),
        }
    }
}

/// Three-level scale shared by prediction confidence and recommendation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    High,
    Medium,
    Low,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::High => write!(f, "High"),
            Level::Medium => write!(f, "Medium"),
            Level::Low => write!(f, "Low"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Level::High),
            "medium" => Ok(Level::Medium),
            "low" => Ok(Level::Low),
            other => Err(format!("unknown level: {other}")),
        }
    }
}

/// Confidence attached to a score forecast.
pub type Confidence = Level;

/// Priority attached to a recommendation.
pub type Priority = Level;

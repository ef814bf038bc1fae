//! Report types with JSON persistence and markdown rendering.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analyzer::{PerformanceSummary, ScorePoint, SubjectAverage};
use crate::class::ClassInsights;
use crate::predict::Prediction;
use crate::recommend::Recommendation;
use crate::topics::TopicRecord;

/// A complete insight report for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentReport {
    pub student_id: String,
    /// When the report was generated. The only field that differs between
    /// two reports built from the same snapshot.
    pub generated_at: DateTime<Utc>,
    pub performance_summary: PerformanceSummary,
    /// Weakest first.
    pub weak_topics: Vec<TopicRecord>,
    /// Strongest first.
    pub strong_topics: Vec<TopicRecord>,
    /// One forecast per attempted subject, keyed by subject.
    pub subject_predictions: BTreeMap<String, Prediction>,
    /// In rule order: skill gaps, study habits, time investment.
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub subject_averages: Vec<SubjectAverage>,
    #[serde(default)]
    pub score_history: Vec<ScorePoint>,
}

/// Outcome of one student in a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StudentOutcome {
    Ok { report: Box<StudentReport> },
    Failed { student_id: String, error: String },
}

impl StudentOutcome {
    pub fn student_id(&self) -> &str {
        match self {
            StudentOutcome::Ok { report } => &report.student_id,
            StudentOutcome::Failed { student_id, .. } => student_id,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, StudentOutcome::Ok { .. })
    }
}

/// Reports for many students plus the class view, from one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Unique run identifier.
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// In the order the students were requested.
    pub students: Vec<StudentOutcome>,
    pub class_insights: ClassInsights,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.students.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.students.len() - self.succeeded()
    }
}

fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read report from {}", path.display()))?;
    serde_json::from_str(&content).context("failed to parse report JSON")
}

impl StudentReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        load_json(path)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let s = &self.performance_summary;
        let mut md = String::new();

        md.push_str(&format!("# Learning Insights: {}\n\n", self.student_id));
        md.push_str(&format!(
            "_Generated {}_\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        md.push_str("## Summary\n\n");
        md.push_str("| Metric | Value |\n|--------|-------|\n");
        md.push_str(&format!("| Average Score | {:.2} |\n", s.average_score));
        md.push_str(&format!("| Median Score | {:.2} |\n", s.median_score));
        md.push_str(&format!("| Total Assessments | {} |\n", s.total_assessments));
        md.push_str(&format!("| Best Subject | {} |\n", s.best_subject));
        md.push_str(&format!("| Weakest Subject | {} |\n", s.weakest_subject));
        md.push_str(&format!("| Improvement Trend | {} |\n", s.improvement_trend));
        md.push_str(&format!("| Total Study Time | {} min |\n", s.total_study_time));
        md.push_str(&format!(
            "| Study Completion Rate | {} |\n\n",
            s.completion_rate
                .map(|r| format!("{r:.1}%"))
                .unwrap_or_else(|| "n/a".to_string())
        ));

        if !self.weak_topics.is_empty() {
            md.push_str("## Topics Needing Attention\n\n");
            for (i, t) in self.weak_topics.iter().take(3).enumerate() {
                md.push_str(&format!(
                    "{}. {} - {} (Avg: {:.1})\n",
                    i + 1,
                    t.subject,
                    t.topic,
                    t.avg_score
                ));
            }
            md.push('\n');
        }

        if !self.strong_topics.is_empty() {
            md.push_str("## Strengths\n\n");
            for t in &self.strong_topics {
                md.push_str(&format!("- {} - {} (Avg: {:.1})\n", t.subject, t.topic, t.avg_score));
            }
            md.push('\n');
        }

        if !self.subject_predictions.is_empty() {
            md.push_str("## Next Assessment Forecast\n\n");
            md.push_str("| Subject | Prediction | Confidence | Trend |\n");
            md.push_str("|---------|------------|------------|-------|\n");
            for (subject, p) in &self.subject_predictions {
                let value = p
                    .prediction
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_else(|| "-".to_string());
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    subject, value, p.confidence, p.recent_trend
                ));
            }
            md.push('\n');
        }

        if !self.recommendations.is_empty() {
            md.push_str("## Recommendations\n\n");
            for (i, r) in self.recommendations.iter().enumerate() {
                md.push_str(&format!("{}. [{}] {}\n", i + 1, r.priority, r.message));
            }
        }

        md
    }
}

impl ClassInsights {
    /// Save the insights as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }

    /// Load insights from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        load_json(path)
    }

    /// Format the class view as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# Class-Level Insights\n\n");
        md.push_str(&format!(
            "**Students:** {} | **Assessments:** {} | **Class Average:** {}\n\n",
            self.total_students,
            self.total_assessments,
            self.class_average
                .map(|a| format!("{a:.2}"))
                .unwrap_or_else(|| "n/a".to_string())
        ));

        let ranking = |md: &mut String, title: &str, rows: &[crate::class::StudentAverage]| {
            md.push_str(&format!("## {title}\n\n"));
            if rows.is_empty() {
                md.push_str("No assessment data.\n\n");
                return;
            }
            for (i, s) in rows.iter().enumerate() {
                md.push_str(&format!("{}. {}: {:.2}\n", i + 1, s.student_id, s.average_score));
            }
            md.push('\n');
        };
        ranking(&mut md, "Top Performers", &self.top_performers);
        ranking(&mut md, "Students Needing Support", &self.struggling_students);

        md.push_str("## Subject Difficulty (Easiest to Hardest)\n\n");
        for s in &self.subject_difficulty {
            let spread = s.std.map(|v| format!(" (±{v:.2})")).unwrap_or_default();
            md.push_str(&format!("- {}: {:.2}{} over {} assessments\n", s.subject, s.mean, spread, s.count));
        }
        md.push('\n');

        let e = &self.engagement_metrics;
        md.push_str("## Engagement\n\n");
        md.push_str(&format!(
            "- Sessions: {}\n- Completion rate: {:.2}%\n- Average session: {:.2} min\n",
            e.total_sessions, e.completion_rate, e.avg_session_duration
        ));

        md
    }
}

impl BatchReport {
    /// Save the batch as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }

    /// Load a batch from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        load_json(path)
    }
}

//! Class-wide rollups: performer rankings, subject difficulty, engagement.

use serde::{Deserialize, Serialize};

use crate::model::{Assessment, StudySession};
use crate::statistics::{group_stats, round2};

/// A student and their mean score across all assessments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAverage {
    pub student_id: String,
    pub average_score: f64,
}

/// Score statistics for one subject across every student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectDifficulty {
    pub subject: String,
    pub mean: f64,
    /// Sample standard deviation; absent for single-assessment subjects.
    pub std: Option<f64>,
    pub count: usize,
}

/// Study-session engagement across the class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub total_sessions: usize,
    /// Completed sessions as a percentage, 0 when there are no sessions.
    pub completion_rate: f64,
    /// Mean session length in minutes, 0 when there are no sessions.
    pub avg_session_duration: f64,
}

/// Class-wide insights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInsights {
    pub total_students: usize,
    pub total_assessments: usize,
    /// Mean of every assessment score; absent when there are none.
    pub class_average: Option<f64>,
    pub top_performers: Vec<StudentAverage>,
    pub struggling_students: Vec<StudentAverage>,
    /// Easiest (highest mean) first.
    pub subject_difficulty: Vec<SubjectDifficulty>,
    pub engagement_metrics: EngagementMetrics,
}

/// Per-student means in first-appearance order.
pub fn student_averages(assessments: &[Assessment]) -> Vec<StudentAverage> {
    group_stats(assessments, |a| a.student_id.clone(), |a| a.score)
        .into_iter()
        .map(|(student_id, stats)| StudentAverage {
            student_id,
            average_score: stats.mean,
        })
        .collect()
}

/// The `n` highest means. Ties keep input order.
pub fn top_performers(averages: &[StudentAverage], n: usize) -> Vec<StudentAverage> {
    let mut ranked = averages.to_vec();
    ranked.sort_by(|a, b| b.average_score.total_cmp(&a.average_score));
    ranked.truncate(n);
    ranked
}

/// The `n` lowest means. Ties keep input order.
pub fn struggling_students(averages: &[StudentAverage], n: usize) -> Vec<StudentAverage> {
    let mut ranked = averages.to_vec();
    ranked.sort_by(|a, b| a.average_score.total_cmp(&b.average_score));
    ranked.truncate(n);
    ranked
}

/// Per-subject statistics, easiest first.
pub fn subject_difficulty(assessments: &[Assessment]) -> Vec<SubjectDifficulty> {
    let mut subjects: Vec<SubjectDifficulty> =
        group_stats(assessments, |a| a.subject.clone(), |a| a.score)
            .into_iter()
            .map(|(subject, stats)| SubjectDifficulty {
                subject,
                mean: stats.mean,
                std: stats.std,
                count: stats.count,
            })
            .collect();
    subjects.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    subjects
}

/// Session completion and duration across the class.
pub fn engagement(sessions: &[StudySession]) -> EngagementMetrics {
    let total = sessions.len();
    if total == 0 {
        return EngagementMetrics {
            total_sessions: 0,
            completion_rate: 0.0,
            avg_session_duration: 0.0,
        };
    }
    let completed = sessions.iter().filter(|s| s.completed).count();
    let minutes: u64 = sessions.iter().map(|s| s.duration_minutes as u64).sum();

    EngagementMetrics {
        total_sessions: total,
        completion_rate: round2(completed as f64 / total as f64 * 100.0),
        avg_session_duration: round2(minutes as f64 / total as f64),
    }
}

/// Compute every class-wide rollup.
pub fn class_insights(
    total_students: usize,
    assessments: &[Assessment],
    sessions: &[StudySession],
    n: usize,
) -> ClassInsights {
    let averages = student_averages(assessments);
    let class_average = if assessments.is_empty() {
        None
    } else {
        Some(assessments.iter().map(|a| a.score).sum::<f64>() / assessments.len() as f64)
    };

    ClassInsights {
        total_students,
        total_assessments: assessments.len(),
        class_average,
        top_performers: top_performers(&averages, n),
        struggling_students: struggling_students(&averages, n),
        subject_difficulty: subject_difficulty(assessments),
        engagement_metrics: engagement(sessions),
    }
}

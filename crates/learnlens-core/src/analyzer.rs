//! The insights analyzer: per-student summaries, topics, forecasts and
//! recommendations over a borrowed, read-only dataset.
//!
//! Every method is a pure function of the dataset and config. The analyzer
//! is `Send + Sync`, so reports for distinct students can be produced in
//! parallel without locking.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::class::{class_insights, ClassInsights};
use crate::config::AnalyzerConfig;
use crate::error::InsightError;
use crate::model::{Assessment, Dataset, TrendLabel};
use crate::predict::{predict_next_score, Prediction};
use crate::recommend::{recommend, Recommendation, RecommendationInputs};
use crate::report::StudentReport;
use crate::statistics::{group_stats_iter, median, sample_std, trend_label, GroupStats};
use crate::topics::{strong_topics, topic_performance, weak_topics, TopicRecord};

/// Headline numbers for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub student_id: String,
    pub total_assessments: usize,
    pub average_score: f64,
    pub median_score: f64,
    /// Sample standard deviation; absent with a single assessment.
    pub score_std: Option<f64>,
    /// Subject with the highest mean score.
    pub best_subject: String,
    /// Subject with the lowest mean score.
    pub weakest_subject: String,
    /// Sum of study session minutes.
    pub total_study_time: u64,
    /// Completed sessions in percent; absent when the student has no sessions.
    pub completion_rate: Option<f64>,
    pub improvement_trend: TrendLabel,
}

/// Mean score in one subject for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAverage {
    pub subject: String,
    pub mean: f64,
    pub std: Option<f64>,
    pub count: usize,
}

/// One point of a student's score history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub date: NaiveDateTime,
    pub subject: String,
    pub topic: String,
    pub score: f64,
}

/// Analyzer over a borrowed dataset.
#[derive(Debug, Clone)]
pub struct InsightsAnalyzer<'a> {
    dataset: &'a Dataset,
    config: AnalyzerConfig,
}

impl<'a> InsightsAnalyzer<'a> {
    pub fn new(dataset: &'a Dataset, config: AnalyzerConfig) -> Self {
        Self { dataset, config }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// A student's assessments sorted by date; ties keep table order.
    fn ordered_assessments(&self, student_id: &str) -> Vec<&'a Assessment> {
        let mut rows: Vec<&'a Assessment> = self
            .dataset
            .assessments
            .iter()
            .filter(|a| a.student_id == student_id)
            .collect();
        rows.sort_by_key(|a| a.assessment_date);
        rows
    }

    /// Per-subject means for a student, ordered by subject name.
    pub fn subject_averages(&self, student_id: &str) -> Vec<SubjectAverage> {
        let mut subjects: Vec<SubjectAverage> = group_stats_iter(
            self.dataset.assessments_for(student_id),
            |a: &Assessment| a.subject.clone(),
            |a: &Assessment| a.score,
        )
        .into_iter()
        .map(|(subject, stats): (String, GroupStats)| SubjectAverage {
            subject,
            mean: stats.mean,
            std: stats.std,
            count: stats.count,
        })
        .collect();
        subjects.sort_by(|a, b| a.subject.cmp(&b.subject));
        subjects
    }

    /// Date-ordered score history.
    pub fn score_history(&self, student_id: &str) -> Vec<ScorePoint> {
        self.ordered_assessments(student_id)
            .into_iter()
            .map(|a| ScorePoint {
                date: a.assessment_date,
                subject: a.subject.clone(),
                topic: a.topic.clone(),
                score: a.score,
            })
            .collect()
    }

    /// Headline summary, or `None` when the student has no assessments.
    pub fn performance_summary(&self, student_id: &str) -> Option<PerformanceSummary> {
        let ordered = self.ordered_assessments(student_id);
        if ordered.is_empty() {
            return None;
        }
        let scores: Vec<f64> = ordered.iter().map(|a| a.score).collect();
        let stats = GroupStats::of(&scores)?;

        let subjects = self.subject_averages(student_id);
        let mut best = subjects.first()?;
        let mut weakest = best;
        for s in &subjects[1..] {
            if s.mean > best.mean {
                best = s;
            }
            if s.mean < weakest.mean {
                weakest = s;
            }
        }

        let (total_study_time, completion_rate) = self.session_totals(student_id);

        Some(PerformanceSummary {
            student_id: student_id.to_string(),
            total_assessments: scores.len(),
            average_score: stats.mean,
            median_score: median(&scores)?,
            score_std: sample_std(&scores),
            best_subject: best.subject.clone(),
            weakest_subject: weakest.subject.clone(),
            total_study_time,
            completion_rate: completion_rate.map(|f| f * 100.0),
            improvement_trend: trend_label(&scores, self.config.trend_min_points),
        })
    }

    /// Total session minutes and completion fraction (absent with no sessions).
    fn session_totals(&self, student_id: &str) -> (u64, Option<f64>) {
        let mut minutes = 0u64;
        let mut total = 0usize;
        let mut completed = 0usize;
        for s in self.dataset.sessions_for(student_id) {
            minutes += s.duration_minutes as u64;
            total += 1;
            if s.completed {
                completed += 1;
            }
        }
        let fraction = (total > 0).then(|| completed as f64 / total as f64);
        (minutes, fraction)
    }

    /// Per-(subject, topic) aggregates for a student.
    pub fn topic_performance(&self, student_id: &str) -> Vec<TopicRecord> {
        topic_performance(self.dataset.assessments_for(student_id))
    }

    /// Topics below the weak threshold, weakest first.
    pub fn weak_topics(&self, student_id: &str) -> Vec<TopicRecord> {
        weak_topics(&self.topic_performance(student_id), self.config.weak_threshold)
    }

    /// Topics at or above the strong threshold, strongest first.
    pub fn strong_topics(&self, student_id: &str) -> Vec<TopicRecord> {
        strong_topics(&self.topic_performance(student_id), self.config.strong_threshold)
    }

    /// Forecast of the next score in `subject`.
    pub fn predict(&self, student_id: &str, subject: &str) -> Prediction {
        let scores: Vec<f64> = self
            .ordered_assessments(student_id)
            .into_iter()
            .filter(|a| a.subject == subject)
            .map(|a| a.score)
            .collect();
        predict_next_score(subject, &scores, &self.config.prediction_params())
    }

    /// Rule-based recommendations for a student.
    pub fn recommendations(&self, student_id: &str) -> Vec<Recommendation> {
        let weak = self.weak_topics(student_id);
        let (_, completion_fraction) = self.session_totals(student_id);

        let minutes: Vec<f64> = self
            .dataset
            .assessments_for(student_id)
            .map(|a| a.time_spent_minutes as f64)
            .collect();
        let avg_time_minutes = GroupStats::of(&minutes).map(|s| s.mean);

        recommend(
            &RecommendationInputs {
                weak_topics: &weak,
                completion_fraction,
                avg_time_minutes,
            },
            &self.config.recommendation_rules(),
        )
    }

    /// Full insight report for one student.
    ///
    /// Fails with [`InsightError::NoDataForStudent`] when the student has no
    /// assessments.
    pub fn student_report(&self, student_id: &str) -> Result<StudentReport, InsightError> {
        let Some(summary) = self.performance_summary(student_id) else {
            tracing::warn!(student_id, "no assessment data for student");
            return Err(InsightError::NoDataForStudent {
                student_id: student_id.to_string(),
            });
        };

        let subject_averages = self.subject_averages(student_id);
        let subject_predictions: BTreeMap<String, Prediction> = subject_averages
            .iter()
            .map(|s| (s.subject.clone(), self.predict(student_id, &s.subject)))
            .collect();

        let report = StudentReport {
            student_id: student_id.to_string(),
            generated_at: Utc::now(),
            performance_summary: summary,
            weak_topics: self.weak_topics(student_id),
            strong_topics: self.strong_topics(student_id),
            subject_predictions,
            recommendations: self.recommendations(student_id),
            subject_averages,
            score_history: self.score_history(student_id),
        };
        tracing::debug!(
            student_id,
            weak = report.weak_topics.len(),
            recommendations = report.recommendations.len(),
            "student report generated"
        );
        Ok(report)
    }

    /// Class-wide insights.
    pub fn class_insights(&self) -> ClassInsights {
        class_insights(
            self.dataset.students.len(),
            &self.dataset.assessments,
            &self.dataset.sessions,
            self.config.top_n,
        )
    }
}

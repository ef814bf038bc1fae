//! Rule-based study recommendations.
//!
//! Rules are evaluated in a fixed order (skill gaps, study habits, time
//! investment) and every applicable rule fires. A rule whose input is
//! missing is skipped.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Level, Priority};
use crate::topics::TopicRecord;

/// What a recommendation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendationCategory {
    #[serde(rename = "Skill Gap")]
    SkillGap,
    #[serde(rename = "Study Habits")]
    StudyHabits,
    #[serde(rename = "Time Investment")]
    TimeInvestment,
}

impl fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationCategory::SkillGap => write!(f, "Skill Gap"),
            RecommendationCategory::StudyHabits => write!(f, "Study Habits"),
            RecommendationCategory::TimeInvestment => write!(f, "Time Investment"),
        }
    }
}

/// Evidence backing a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecommendationDetails {
    /// The weakest topics, lowest mean first.
    Topics { topics: Vec<TopicRecord> },
    /// Session completion below the floor.
    Completion {
        /// Completion rate in percent.
        completion_rate: f64,
        suggestion: String,
    },
    /// Low average time spent per assessment.
    TimeOnTask { avg_minutes: f64, current_avg: String },
}

/// A single prioritized recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    #[serde(rename = "type")]
    pub category: RecommendationCategory,
    pub message: String,
    pub details: RecommendationDetails,
}

/// Tunable thresholds for the recommendation rules.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationRules {
    /// How many weak topics a skill-gap recommendation names.
    pub max_skill_gap_topics: usize,
    /// Completion fraction below which study habits are flagged.
    pub completion_rate_floor: f64,
    /// Average minutes per assessment below which time investment is flagged.
    pub min_avg_time_minutes: f64,
}

impl Default for RecommendationRules {
    fn default() -> Self {
        Self {
            max_skill_gap_topics: 3,
            completion_rate_floor: 0.7,
            min_avg_time_minutes: 20.0,
        }
    }
}

/// Inputs for one student's recommendations.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationInputs<'a> {
    /// Weak topics, already sorted weakest first.
    pub weak_topics: &'a [TopicRecord],
    /// Session completion as a fraction, `None` when the student has no sessions.
    pub completion_fraction: Option<f64>,
    /// Mean time spent per assessment, `None` when there are no assessments.
    pub avg_time_minutes: Option<f64>,
}

/// Run every rule in order and collect what fires.
pub fn recommend(inputs: &RecommendationInputs<'_>, rules: &RecommendationRules) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if !inputs.weak_topics.is_empty() {
        let top: Vec<TopicRecord> = inputs
            .weak_topics
            .iter()
            .take(rules.max_skill_gap_topics.max(1))
            .cloned()
            .collect();
        let names: Vec<&str> = top.iter().map(|t| t.topic.as_str()).collect();
        out.push(Recommendation {
            priority: Level::High,
            category: RecommendationCategory::SkillGap,
            message: format!("Focus on improving: {}", names.join(", ")),
            details: RecommendationDetails::Topics { topics: top },
        });
    }

    if let Some(rate) = inputs.completion_fraction {
        if rate < rules.completion_rate_floor {
            out.push(Recommendation {
                priority: Level::Medium,
                category: RecommendationCategory::StudyHabits,
                message: format!(
                    "Improve study session completion rate (currently {:.1}%)",
                    rate * 100.0
                ),
                details: RecommendationDetails::Completion {
                    completion_rate: rate * 100.0,
                    suggestion: "Break study sessions into smaller, manageable chunks".to_string(),
                },
            });
        }
    }

    if let Some(avg) = inputs.avg_time_minutes {
        if avg < rules.min_avg_time_minutes {
            out.push(Recommendation {
                priority: Level::Low,
                category: RecommendationCategory::TimeInvestment,
                message: "Consider spending more time on assessments for better understanding"
                    .to_string(),
                details: RecommendationDetails::TimeOnTask {
                    avg_minutes: avg,
                    current_avg: format!("{avg:.1} minutes"),
                },
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weak(topic: &str, avg: f64) -> TopicRecord {
        TopicRecord {
            subject: "Science".into(),
            topic: topic.into(),
            avg_score: avg,
            attempts: 2,
        }
    }

    #[test]
    fn single_weak_topic_without_sessions() {
        let topics = vec![weak("Chemistry", 55.0)];
        let recs = recommend(
            &RecommendationInputs {
                weak_topics: &topics,
                completion_fraction: None,
                avg_time_minutes: Some(25.0),
            },
            &RecommendationRules::default(),
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Level::High);
        assert_eq!(recs[0].category, RecommendationCategory::SkillGap);
        assert_eq!(recs[0].message, "Focus on improving: Chemistry");
    }

    #[test]
    fn all_rules_fire_in_order() {
        let topics = vec![
            weak("Physics", 30.0),
            weak("Biology", 40.0),
            weak("Lab Skills", 50.0),
            weak("Chemistry", 60.0),
        ];
        let recs = recommend(
            &RecommendationInputs {
                weak_topics: &topics,
                completion_fraction: Some(0.5),
                avg_time_minutes: Some(12.3),
            },
            &RecommendationRules::default(),
        );
        let categories: Vec<RecommendationCategory> = recs.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![
                RecommendationCategory::SkillGap,
                RecommendationCategory::StudyHabits,
                RecommendationCategory::TimeInvestment,
            ]
        );
        assert_eq!(recs[0].message, "Focus on improving: Physics, Biology, Lab Skills");
        assert_eq!(
            recs[1].message,
            "Improve study session completion rate (currently 50.0%)"
        );
        match &recs[2].details {
            RecommendationDetails::TimeOnTask { current_avg, .. } => {
                assert_eq!(current_avg, "12.3 minutes")
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn nothing_fires_for_healthy_student() {
        let recs = recommend(
            &RecommendationInputs {
                weak_topics: &[],
                completion_fraction: Some(0.7),
                avg_time_minutes: Some(20.0),
            },
            &RecommendationRules::default(),
        );
        assert!(recs.is_empty());
    }

    #[test]
    fn category_serializes_as_type_literal() {
        let rec = Recommendation {
            priority: Level::Low,
            category: RecommendationCategory::TimeInvestment,
            message: String::new(),
            details: RecommendationDetails::TimeOnTask {
                avg_minutes: 10.0,
                current_avg: "10.0 minutes".into(),
            },
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "Time Investment");
        assert_eq!(json["priority"], "Low");
        assert_eq!(json["details"]["kind"], "time_on_task");
    }
}

//! Weak / strong topic classification.

use serde::{Deserialize, Serialize};

use crate::model::Assessment;
use crate::statistics::group_stats_iter;

/// Mean score and attempt count for one (subject, topic) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub subject: String,
    pub topic: String,
    pub avg_score: f64,
    pub attempts: usize,
}

/// Aggregate a student's assessments per (subject, topic).
pub fn topic_performance<'a, I>(assessments: I) -> Vec<TopicRecord>
where
    I: IntoIterator<Item = &'a Assessment>,
{
    group_stats_iter(
        assessments,
        |a: &Assessment| (a.subject.clone(), a.topic.clone()),
        |a: &Assessment| a.score,
    )
    .into_iter()
    .map(|((subject, topic), stats)| TopicRecord {
        subject,
        topic,
        avg_score: stats.mean,
        attempts: stats.count,
    })
    .collect()
}

/// Topics with a mean strictly below `threshold`, weakest first.
pub fn weak_topics(topics: &[TopicRecord], threshold: f64) -> Vec<TopicRecord> {
    let mut weak: Vec<TopicRecord> = topics
        .iter()
        .filter(|t| t.avg_score < threshold)
        .cloned()
        .collect();
    weak.sort_by(|a, b| {
        a.avg_score
            .total_cmp(&b.avg_score)
            .then_with(|| a.subject.cmp(&b.subject))
            .then_with(|| a.topic.cmp(&b.topic))
    });
    weak
}

/// Topics with a mean at or above `threshold`, strongest first.
pub fn strong_topics(topics: &[TopicRecord], threshold: f64) -> Vec<TopicRecord> {
    let mut strong: Vec<TopicRecord> = topics
        .iter()
        .filter(|t| t.avg_score >= threshold)
        .cloned()
        .collect();
    strong.sort_by(|a, b| {
        b.avg_score
            .total_cmp(&a.avg_score)
            .then_with(|| a.subject.cmp(&b.subject))
            .then_with(|| a.topic.cmp(&b.topic))
    });
    strong
}

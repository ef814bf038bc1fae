//! Batch report engine.
//!
//! Fans per-student report requests out over the blocking thread pool with
//! bounded parallelism. Every request reads the same shared snapshot, so no
//! locking is involved.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::analyzer::InsightsAnalyzer;
use crate::config::AnalyzerConfig;
use crate::model::Dataset;
use crate::report::{BatchReport, StudentOutcome, StudentReport};

/// Configuration for the batch engine.
#[derive(Debug, Clone)]
pub struct BatchEngineConfig {
    /// Maximum concurrent per-student reports.
    pub parallelism: usize,
    pub analyzer: AnalyzerConfig,
}

impl Default for BatchEngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            analyzer: AnalyzerConfig::default(),
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_student_start(&self, student_id: &str);
    fn on_student_complete(&self, report: &StudentReport);
    fn on_student_error(&self, student_id: &str, error: &str);
    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_student_start(&self, _: &str) {}
    fn on_student_complete(&self, _: &StudentReport) {}
    fn on_student_error(&self, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Produces reports for many students from one snapshot.
pub struct BatchEngine {
    config: BatchEngineConfig,
}

impl BatchEngine {
    pub fn new(config: BatchEngineConfig) -> Self {
        Self { config }
    }

    /// Generate a report for every id in `student_ids`.
    ///
    /// Students without data become [`StudentOutcome::Failed`] entries; the
    /// batch as a whole still succeeds. Outcomes keep the requested order.
    pub async fn run(
        &self,
        dataset: Arc<Dataset>,
        student_ids: &[String],
        progress: &dyn ProgressReporter,
    ) -> Result<BatchReport> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));

        let mut futures = FuturesUnordered::new();

        for (index, student_id) in student_ids.iter().enumerate() {
            let dataset = Arc::clone(&dataset);
            let semaphore = Arc::clone(&semaphore);
            let config = self.config.analyzer.clone();
            let student_id = student_id.clone();

            futures.push(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                progress.on_student_start(&student_id);

                let id = student_id.clone();
                let result = tokio::task::spawn_blocking(move || {
                    InsightsAnalyzer::new(&dataset, config).student_report(&id)
                })
                .await
                .map_err(|e| anyhow::anyhow!("report task for {student_id} failed: {e}"))?;

                anyhow::Ok((index, student_id, result))
            });
        }

        let mut outcomes = Vec::with_capacity(student_ids.len());
        let mut completed = 0usize;
        let mut failed = 0usize;
        let total = futures.len();

        while let Some(next) = futures.next().await {
            let (index, student_id, result) = next?;
            match result {
                Ok(report) => {
                    progress.on_student_complete(&report);
                    outcomes.push((
                        index,
                        StudentOutcome::Ok {
                            report: Box::new(report),
                        },
                    ));
                    completed += 1;
                }
                Err(e) => {
                    tracing::warn!("report failed for {student_id}: {e}");
                    progress.on_student_error(&student_id, &e.to_string());
                    outcomes.push((
                        index,
                        StudentOutcome::Failed {
                            student_id,
                            error: e.to_string(),
                        },
                    ));
                    failed += 1;
                }
            }
        }

        outcomes.sort_by_key(|(index, _)| *index);

        let class_insights =
            InsightsAnalyzer::new(&dataset, self.config.analyzer.clone()).class_insights();

        let elapsed = start.elapsed();
        progress.on_batch_complete(total, completed, failed, elapsed);
        tracing::info!(
            %run_id,
            completed,
            failed,
            "batch finished in {:.1}s",
            elapsed.as_secs_f64()
        );

        Ok(BatchReport {
            id: run_id,
            created_at: chrono::Utc::now(),
            students: outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
            class_insights,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assessment, Difficulty, Student};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingReporter {
        started: AtomicUsize,
        errors: AtomicUsize,
    }

    impl ProgressReporter for CountingReporter {
        fn on_student_start(&self, _: &str) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }
        fn on_student_complete(&self, _: &StudentReport) {}
        fn on_student_error(&self, _: &str, _: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
        fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
    }

    fn dataset() -> Dataset {
        let student = |id: &str| Student {
            student_id: id.into(),
            name: id.into(),
            grade_level: 11,
            base_ability: None,
            learning_rate: None,
            engagement_level: None,
            study_hours_per_week: None,
        };
        let assessments = (0..12)
            .map(|i| Assessment {
                student_id: if i % 2 == 0 { "A".into() } else { "B".into() },
                subject: "Mathematics".into(),
                topic: "Algebra".into(),
                assessment_date: NaiveDate::from_ymd_opt(2025, 2, 1 + i as u32)
                    .unwrap()
                    .and_hms_opt(8, 0, 0)
                    .unwrap(),
                score: 60.0 + i as f64,
                max_score: 100.0,
                time_spent_minutes: 25,
                attempts: 1,
                difficulty_level: Difficulty::Easy,
            })
            .collect();
        Dataset::new(vec![student("A"), student("B"), student("C")], assessments, vec![])
    }

    #[tokio::test]
    async fn batch_keeps_requested_order_and_records_failures() {
        let engine = BatchEngine::new(BatchEngineConfig {
            parallelism: 2,
            ..Default::default()
        });
        let reporter = CountingReporter {
            started: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        };
        let ids = vec!["C".to_string(), "B".to_string(), "A".to_string()];

        let batch = engine.run(Arc::new(dataset()), &ids, &reporter).await.unwrap();

        let order: Vec<&str> = batch.students.iter().map(|o| o.student_id()).collect();
        assert_eq!(order, vec!["C", "B", "A"]);
        assert!(!batch.students[0].is_ok());
        assert_eq!(batch.succeeded(), 2);
        assert_eq!(batch.failed(), 1);
        assert_eq!(reporter.started.load(Ordering::SeqCst), 3);
        assert_eq!(reporter.errors.load(Ordering::SeqCst), 1);
        assert_eq!(batch.class_insights.total_students, 3);
        assert_eq!(batch.class_insights.top_performers[0].student_id, "B");
    }

    #[tokio::test]
    async fn empty_batch() {
        let engine = BatchEngine::new(BatchEngineConfig::default());
        let batch = engine
            .run(Arc::new(Dataset::default()), &[], &NoopReporter)
            .await
            .unwrap();
        assert!(batch.students.is_empty());
        assert_eq!(batch.class_insights.class_average, None);
    }
}

//! The `learnlens batch` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use learnlens_core::engine::{BatchEngine, BatchEngineConfig, ProgressReporter};
use learnlens_core::report::StudentReport;

use super::{load, resolve_config};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_student_start(&self, student_id: &str) {
        eprintln!("  Starting: {student_id}");
    }

    fn on_student_complete(&self, report: &StudentReport) {
        let s = &report.performance_summary;
        eprintln!(
            "  Done: {} avg {:.1} ({}, {} recommendation(s))",
            report.student_id,
            s.average_score,
            s.improvement_trend,
            report.recommendations.len()
        );
    }

    fn on_student_error(&self, student_id: &str, error: &str) {
        eprintln!("  SKIPPED: {student_id}: {error}");
    }

    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} reports, {failed} without data ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    data: Option<PathBuf>,
    output: Option<PathBuf>,
    parallelism: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = resolve_config(config_path.as_deref(), data, output)?;
    if let Some(parallelism) = parallelism {
        anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");
        config.parallelism = parallelism;
    }

    let dataset = Arc::new(load(&config)?);
    let student_ids = dataset.student_ids();

    eprintln!(
        "learnlens v{} - Generating reports for {} students",
        env!("CARGO_PKG_VERSION"),
        student_ids.len()
    );
    eprintln!();

    let engine = BatchEngine::new(BatchEngineConfig {
        parallelism: config.parallelism,
        analyzer: config.analyzer.clone(),
    });
    let batch = engine
        .run(Arc::clone(&dataset), &student_ids, &ConsoleReporter)
        .await?;

    super::class::print_summary(&batch.class_insights);

    std::fs::create_dir_all(&config.output_dir)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    let path = config.output_dir.join(format!("batch-{timestamp}.json"));
    batch.save_json(&path)?;
    tracing::info!(
        succeeded = batch.succeeded(),
        failed = batch.failed(),
        "wrote {}",
        path.display()
    );
    eprintln!("Results saved to: {}", path.display());

    Ok(())
}

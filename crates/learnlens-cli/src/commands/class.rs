//! The `learnlens class` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use learnlens_core::class::ClassInsights;
use learnlens_core::InsightsAnalyzer;
use learnlens_report::html::write_class_html;

use super::{load, parse_formats, resolve_config, Format};

pub fn execute(
    data: Option<PathBuf>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let formats = parse_formats(&format)?;
    let config = resolve_config(config_path.as_deref(), data, output)?;
    let dataset = load(&config)?;

    let insights = InsightsAnalyzer::new(&dataset, config.analyzer.clone()).class_insights();

    print_summary(&insights);

    std::fs::create_dir_all(&config.output_dir)?;
    for fmt in formats {
        let path = config
            .output_dir
            .join(format!("class_insights.{}", fmt.extension()));
        match fmt {
            Format::Json => insights.save_json(&path)?,
            Format::Html => write_class_html(&insights, &path)?,
            Format::Markdown => std::fs::write(&path, insights.to_markdown())?,
        }
        tracing::info!(format = fmt.extension(), "wrote {}", path.display());
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

pub(crate) fn print_summary(insights: &ClassInsights) {
    println!(
        "{} students, {} assessments, class average {}",
        insights.total_students,
        insights.total_assessments,
        insights
            .class_average
            .map(|avg| format!("{avg:.2}"))
            .unwrap_or_else(|| "-".to_string())
    );

    if !insights.subject_difficulty.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Subject", "Mean", "Std Dev", "Assessments"]);
        for s in &insights.subject_difficulty {
            table.add_row(vec![
                Cell::new(&s.subject),
                Cell::new(format!("{:.2}", s.mean)),
                Cell::new(
                    s.std
                        .map(|v| format!("{v:.2}"))
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::new(s.count),
            ]);
        }
        println!("{table}");
    }

    let e = &insights.engagement_metrics;
    println!(
        "Sessions: {} ({:.2}% completed, avg {:.2} minutes)",
        e.total_sessions, e.completion_rate, e.avg_session_duration
    );
}

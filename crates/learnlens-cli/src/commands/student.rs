//! The `learnlens student` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use learnlens_core::report::StudentReport;
use learnlens_core::InsightsAnalyzer;
use learnlens_report::html::write_student_html;

use super::{load, parse_formats, resolve_config, Format};

pub fn execute(
    student_id: String,
    data: Option<PathBuf>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let formats = parse_formats(&format)?;
    let config = resolve_config(config_path.as_deref(), data, output)?;
    let dataset = load(&config)?;

    let analyzer = InsightsAnalyzer::new(&dataset, config.analyzer.clone());
    let report = analyzer.student_report(&student_id)?;

    print_summary(&report);

    std::fs::create_dir_all(&config.output_dir)?;
    for fmt in formats {
        let path = config
            .output_dir
            .join(format!("{student_id}_report.{}", fmt.extension()));
        match fmt {
            Format::Json => report.save_json(&path)?,
            Format::Html => write_student_html(&report, &path)?,
            Format::Markdown => std::fs::write(&path, report.to_markdown())?,
        }
        tracing::info!(student_id = %student_id, format = fmt.extension(), "wrote {}", path.display());
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_summary(report: &StudentReport) {
    let s = &report.performance_summary;

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Student"), Cell::new(&report.student_id)]);
    table.add_row(vec![
        Cell::new("Assessments"),
        Cell::new(s.total_assessments),
    ]);
    table.add_row(vec![
        Cell::new("Average"),
        Cell::new(format!("{:.2}", s.average_score)),
    ]);
    table.add_row(vec![Cell::new("Best subject"), Cell::new(&s.best_subject)]);
    table.add_row(vec![
        Cell::new("Weakest subject"),
        Cell::new(&s.weakest_subject),
    ]);
    table.add_row(vec![
        Cell::new("Completion"),
        Cell::new(match s.completion_rate {
            Some(rate) => format!("{rate:.1}%"),
            None => "-".to_string(),
        }),
    ]);
    table.add_row(vec![Cell::new("Trend"), Cell::new(s.improvement_trend)]);

    println!("{table}");

    if !report.recommendations.is_empty() {
        println!("\nRecommendations:");
        for (i, rec) in report.recommendations.iter().enumerate() {
            println!("  {}. [{}] {}", i + 1, rec.priority, rec.message);
        }
    }
}

//! HTML report generator.
//!
//! Produces self-contained HTML files with all CSS inlined and charts drawn
//! as inline SVG.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use learnlens_core::class::{ClassInsights, StudentAverage};
use learnlens_core::report::StudentReport;
use learnlens_core::topics::TopicRecord;

/// Escape a string for safe HTML insertion.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn fmt_opt(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) => format!("{v:.2}{suffix}"),
        None => "-".to_string(),
    }
}

fn page_head(html: &mut String, title: &str) {
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", html_escape(title)));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");
}

fn raw_json<T: Serialize>(html: &mut String, value: &T) {
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(value).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");
}

fn topic_table(html: &mut String, id: &str, topics: &[TopicRecord]) {
    if topics.is_empty() {
        html.push_str("<p class=\"empty\">None.</p>\n");
        return;
    }
    html.push_str(&format!("<table class=\"topics\" id=\"{id}\">\n"));
    html.push_str(
        "<thead><tr><th>Subject</th><th>Topic</th><th>Average</th><th>Attempts</th></tr></thead>\n",
    );
    html.push_str("<tbody>\n");
    for t in topics {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.1}</td><td>{}</td></tr>\n",
            html_escape(&t.subject),
            html_escape(&t.topic),
            t.avg_score,
            t.attempts
        ));
    }
    html.push_str("</tbody></table>\n");
}

fn ranking_table(html: &mut String, students: &[StudentAverage]) {
    if students.is_empty() {
        html.push_str("<p class=\"empty\">No assessment data.</p>\n");
        return;
    }
    html.push_str("<table class=\"ranking\">\n");
    html.push_str("<thead><tr><th>#</th><th>Student</th><th>Average</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for (i, s) in students.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td></tr>\n",
            i + 1,
            html_escape(&s.student_id),
            s.average_score
        ));
    }
    html.push_str("</tbody></table>\n");
}

/// Generate the HTML page for one student report.
pub fn generate_student_html(report: &StudentReport) -> String {
    let summary = &report.performance_summary;
    let mut html = String::new();

    page_head(
        &mut html,
        &format!("learnlens report: {}", report.student_id),
    );

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!(
        "<h1>Learning Insights: {}</h1>\n",
        html_escape(&report.student_id)
    ));
    html.push_str(&format!(
        "<p class=\"meta\">{} assessments | generated {}</p>\n",
        summary.total_assessments,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Performance Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n<tbody>\n");
    let rows = [
        ("Average Score", format!("{:.2}", summary.average_score)),
        ("Median Score", format!("{:.2}", summary.median_score)),
        ("Score Std Dev", fmt_opt(summary.score_std, "")),
        ("Best Subject", html_escape(&summary.best_subject)),
        ("Weakest Subject", html_escape(&summary.weakest_subject)),
        (
            "Total Study Time",
            format!("{} minutes", summary.total_study_time),
        ),
        ("Session Completion", fmt_opt(summary.completion_rate, "%")),
        (
            "Trend",
            format!(
                "<span class=\"trend\">{}</span>",
                summary.improvement_trend
            ),
        ),
    ];
    for (label, value) in rows {
        html.push_str(&format!("<tr><th>{label}</th><td>{value}</td></tr>\n"));
    }
    html.push_str("</tbody></table>\n");

    if !report.subject_averages.is_empty() {
        html.push_str("<h3>Average by Subject</h3>\n");
        let bars: Vec<(&str, f64)> = report
            .subject_averages
            .iter()
            .map(|s| (s.subject.as_str(), s.mean))
            .collect();
        html.push_str(&bar_chart(&bars));
    }
    html.push_str("</section>\n");

    // Topics
    html.push_str("<section class=\"topics\">\n");
    html.push_str("<h2>Topics Needing Attention</h2>\n");
    topic_table(&mut html, "weak-topics", &report.weak_topics);
    html.push_str("<h2>Strong Topics</h2>\n");
    topic_table(&mut html, "strong-topics", &report.strong_topics);
    html.push_str("</section>\n");

    // Predictions
    html.push_str("<section class=\"predictions\">\n");
    html.push_str("<h2>Predictions</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>Subject</th><th>Next Score</th><th>Confidence</th><th>Trend</th><th>Observations</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for (subject, p) in &report.subject_predictions {
        let next = match (p.prediction, &p.message) {
            (Some(v), _) => format!("{v:.2}"),
            (None, Some(msg)) => html_escape(msg),
            (None, None) => "-".to_string(),
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(subject),
            next,
            p.confidence,
            p.recent_trend,
            p.observations
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Recommendations
    html.push_str("<section class=\"recommendations\">\n");
    html.push_str("<h2>Recommendations</h2>\n");
    if report.recommendations.is_empty() {
        html.push_str("<p class=\"empty\">No recommendations, keep it up.</p>\n");
    } else {
        html.push_str("<ol>\n");
        for rec in &report.recommendations {
            let class = rec.priority.to_string().to_lowercase();
            html.push_str(&format!(
                "<li><span class=\"badge {class}\">{}</span> <strong>{}</strong>: {}</li>\n",
                rec.priority,
                rec.category,
                html_escape(&rec.message)
            ));
        }
        html.push_str("</ol>\n");
    }
    html.push_str("</section>\n");

    // Score history
    if !report.score_history.is_empty() {
        html.push_str("<section class=\"history\">\n");
        html.push_str("<h2>Score History</h2>\n");
        html.push_str("<table>\n");
        html.push_str(
            "<thead><tr><th>Date</th><th>Subject</th><th>Topic</th><th>Score</th></tr></thead>\n",
        );
        html.push_str("<tbody>\n");
        for point in &report.score_history {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.1}</td></tr>\n",
                point.date.format("%Y-%m-%d"),
                html_escape(&point.subject),
                html_escape(&point.topic),
                point.score
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    raw_json(&mut html, report);

    html.push_str("</body>\n</html>");
    html
}

/// Generate the HTML page for the class view.
pub fn generate_class_html(insights: &ClassInsights) -> String {
    let mut html = String::new();

    page_head(&mut html, "learnlens class insights");

    html.push_str("<header>\n");
    html.push_str("<h1>Class-Level Insights</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} students | {} assessments | class average {}</p>\n",
        insights.total_students,
        insights.total_assessments,
        fmt_opt(insights.class_average, "")
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"rankings\">\n");
    html.push_str("<h2>Top Performers</h2>\n");
    ranking_table(&mut html, &insights.top_performers);
    html.push_str("<h2>Students Needing Support</h2>\n");
    ranking_table(&mut html, &insights.struggling_students);
    html.push_str("</section>\n");

    html.push_str("<section class=\"difficulty\">\n");
    html.push_str("<h2>Subject Difficulty (Easiest to Hardest)</h2>\n");
    if insights.subject_difficulty.is_empty() {
        html.push_str("<p class=\"empty\">No assessment data.</p>\n");
    } else {
        let bars: Vec<(&str, f64)> = insights
            .subject_difficulty
            .iter()
            .map(|s| (s.subject.as_str(), s.mean))
            .collect();
        html.push_str(&bar_chart(&bars));

        html.push_str("<table>\n");
        html.push_str(
            "<thead><tr><th>Subject</th><th>Mean</th><th>Std Dev</th><th>Count</th></tr></thead>\n",
        );
        html.push_str("<tbody>\n");
        for s in &insights.subject_difficulty {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{:.2}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&s.subject),
                s.mean,
                fmt_opt(s.std, ""),
                s.count
            ));
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    let e = &insights.engagement_metrics;
    html.push_str("<section class=\"engagement\">\n");
    html.push_str("<h2>Engagement</h2>\n");
    html.push_str("<table class=\"summary\">\n<tbody>\n");
    html.push_str(&format!(
        "<tr><th>Total Sessions</th><td>{}</td></tr>\n",
        e.total_sessions
    ));
    html.push_str(&format!(
        "<tr><th>Completion Rate</th><td>{:.2}%</td></tr>\n",
        e.completion_rate
    ));
    html.push_str(&format!(
        "<tr><th>Avg Session Duration</th><td>{:.2} minutes</td></tr>\n",
        e.avg_session_duration
    ));
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    raw_json(&mut html, insights);

    html.push_str("</body>\n</html>");
    html
}

/// Write a student report page to a file.
pub fn write_student_html(report: &StudentReport, path: &Path) -> Result<()> {
    write_page(&generate_student_html(report), path)
}

/// Write the class insights page to a file.
pub fn write_class_html(insights: &ClassInsights, path: &Path) -> Result<()> {
    write_page(&generate_class_html(insights), path)
}

fn write_page(html: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

/// Horizontal bar chart of 0-100 scores.
fn bar_chart(bars: &[(&str, f64)]) -> String {
    let bar_height = 26;
    let max_width = 400;
    let padding = 10;
    let label_width = 180;

    let total_height = bars.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (label, score)) in bars.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (score.clamp(0.0, 100.0) / 100.0 * max_width as f64) as usize;

        let color = if *score >= 85.0 {
            "#22c55e"
        } else if *score >= 70.0 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(label)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            score
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --high: #fde2e2; --medium: #fef3c7; --low: #dcfce7; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --high: #7f1d1d; --medium: #78350f; --low: #064e3b; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta, .empty { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.badge { padding: 0.1rem 0.5rem; border-radius: 4px; font-size: 0.85rem; }
.badge.high { background: var(--high); }
.badge.medium { background: var(--medium); }
.badge.low { background: var(--low); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use learnlens_core::model::{Assessment, Dataset, Difficulty, Student, StudySession};
    use learnlens_core::{AnalyzerConfig, InsightsAnalyzer};

    fn make_dataset() -> Dataset {
        let student = |id: &str| Student {
            student_id: id.into(),
            name: id.into(),
            grade_level: 10,
            base_ability: None,
            learning_rate: None,
            engagement_level: None,
            study_hours_per_week: None,
        };
        let date = |d: u32| {
            chrono::NaiveDate::from_ymd_opt(2025, 3, d)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap()
        };
        let scored = |id: &str, subject: &str, topic: &str, d: u32, score: f64| Assessment {
            student_id: id.into(),
            subject: subject.into(),
            topic: topic.into(),
            assessment_date: date(d),
            score,
            max_score: 100.0,
            time_spent_minutes: 12,
            attempts: 1,
            difficulty_level: Difficulty::Hard,
        };
        Dataset::new(
            vec![student("STU001"), student("STU002")],
            vec![
                scored("STU001", "Mathematics", "Algebra", 1, 52.0),
                scored("STU001", "Mathematics", "Algebra", 2, 58.0),
                scored("STU001", "Science", "Physics <Intro>", 3, 91.0),
                scored("STU002", "Science", "Physics <Intro>", 3, 77.0),
            ],
            vec![StudySession {
                student_id: "STU001".into(),
                session_date: date(2),
                subject: "Mathematics".into(),
                duration_minutes: 45,
                completed: false,
            }],
        )
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            html_escape("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn student_page_contains_required_sections() {
        let dataset = make_dataset();
        let analyzer = InsightsAnalyzer::new(&dataset, AnalyzerConfig::default());
        let report = analyzer.student_report("STU001").unwrap();
        let html = generate_student_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Learning Insights: STU001"));
        assert!(html.contains("Topics Needing Attention"));
        assert!(html.contains("Algebra"));
        assert!(html.contains("Skill Gap"));
        assert!(html.contains("<svg"));
        assert!(html.contains("Physics &lt;Intro&gt;"));
        assert!(!html.contains("Physics <Intro>"));
    }

    #[test]
    fn class_page_lists_rankings_and_engagement() {
        let dataset = make_dataset();
        let analyzer = InsightsAnalyzer::new(&dataset, AnalyzerConfig::default());
        let html = generate_class_html(&analyzer.class_insights());

        assert!(html.contains("Class-Level Insights"));
        assert!(html.contains("STU002"));
        assert!(html.contains("Subject Difficulty (Easiest to Hardest)"));
        assert!(html.contains("<tr><th>Total Sessions</th><td>1</td></tr>"));
        assert!(html.contains("0.00%"));
    }

    #[test]
    fn empty_class_renders_placeholders() {
        let dataset = Dataset::default();
        let analyzer = InsightsAnalyzer::new(&dataset, AnalyzerConfig::default());
        let html = generate_class_html(&analyzer.class_insights());

        assert!(html.contains("class average -"));
        assert!(html.contains("No assessment data."));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn html_pages_write_to_file() {
        let dataset = make_dataset();
        let analyzer = InsightsAnalyzer::new(&dataset, AnalyzerConfig::default());
        let dir = tempfile::tempdir().unwrap();

        let student_path = dir.path().join("nested").join("STU001_report.html");
        let report = analyzer.student_report("STU001").unwrap();
        write_student_html(&report, &student_path).unwrap();
        assert!(std::fs::read_to_string(&student_path)
            .unwrap()
            .contains("<html"));

        let class_path = dir.path().join("class_insights.html");
        write_class_html(&analyzer.class_insights(), &class_path).unwrap();
        assert!(class_path.exists());
    }
}

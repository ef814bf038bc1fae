//! The `learnlens validate` command.

use std::path::PathBuf;

use anyhow::Result;

use learnlens_core::loader::validate_dataset;

use super::{load, resolve_config};

pub fn execute(data: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path.as_deref(), data, None)?;
    let dataset = load(&config)?;

    println!(
        "Data set: {} ({} students, {} assessments, {} sessions)",
        config.data_dir.display(),
        dataset.students.len(),
        dataset.assessments.len(),
        dataset.sessions.len()
    );

    let warnings = validate_dataset(&dataset);
    tracing::debug!(warnings = warnings.len(), "validated {}", config.data_dir.display());
    for w in &warnings {
        let prefix = w
            .student_id
            .as_ref()
            .map(|id| format!("  [{}:{} {id}]", w.table, w.row + 1))
            .unwrap_or_else(|| format!("  [{}:{}]", w.table, w.row + 1));
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Data set valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}

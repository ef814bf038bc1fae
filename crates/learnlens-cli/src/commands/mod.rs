pub mod batch;
pub mod class;
pub mod init;
pub mod student;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Result;

use learnlens_core::config::load_config_from;
use learnlens_core::loader::load_dataset;
use learnlens_core::{Dataset, LearnlensConfig};

/// Report file formats accepted by `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Html,
    Markdown,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Html => "html",
            Format::Markdown => "md",
        }
    }
}

/// Parse a `--format` value: `all` or a comma-separated list.
pub fn parse_formats(raw: &str) -> Result<Vec<Format>> {
    if raw.trim() == "all" {
        return Ok(vec![Format::Json, Format::Html, Format::Markdown]);
    }
    let mut formats = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let format = match part {
            "json" => Format::Json,
            "html" => Format::Html,
            "md" | "markdown" => Format::Markdown,
            other => anyhow::bail!("unknown format '{other}' (expected json, html, md or all)"),
        };
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    anyhow::ensure!(!formats.is_empty(), "--format must name at least one format");
    Ok(formats)
}

/// Load config and apply command-line overrides on top of it.
pub fn resolve_config(
    config_path: Option<&Path>,
    data: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<LearnlensConfig> {
    let mut config = load_config_from(config_path)?;
    if let Some(data) = data {
        config.data_dir = data;
    }
    if let Some(output) = output {
        config.output_dir = output;
    }
    Ok(config)
}

/// Load the dataset named by `config`.
pub fn load(config: &LearnlensConfig) -> Result<Dataset> {
    load_dataset(&config.data_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse() {
        assert_eq!(parse_formats("json").unwrap(), vec![Format::Json]);
        assert_eq!(
            parse_formats("html, md,html").unwrap(),
            vec![Format::Html, Format::Markdown]
        );
        assert_eq!(parse_formats("all").unwrap().len(), 3);
        assert!(parse_formats("sarif").is_err());
        assert!(parse_formats(" , ").is_err());
    }
}

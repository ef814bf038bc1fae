//! learnlens configuration.
//!
//! Loaded from `learnlens.toml`; every field has a default so an empty or
//! missing file yields the documented grading policy.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::predict::{PredictionParams, RECENCY_WEIGHTS};
use crate::recommend::RecommendationRules;
use crate::statistics::MIN_TREND_POINTS;

/// Thresholds and window sizes used by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Topics with a mean strictly below this are weak.
    #[serde(default = "default_weak_threshold")]
    pub weak_threshold: f64,
    /// Topics with a mean at or above this are strong.
    #[serde(default = "default_strong_threshold")]
    pub strong_threshold: f64,
    /// Size of the top / bottom performer lists.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Minimum series length for a trend fit.
    #[serde(default = "default_trend_min_points")]
    pub trend_min_points: usize,
    /// Minimum subject history for a numeric forecast.
    #[serde(default = "default_prediction_min_points")]
    pub prediction_min_points: usize,
    /// Recent scores weighted by the forecast (1 to 5).
    #[serde(default = "default_prediction_window")]
    pub prediction_window: usize,
    /// Weak topics named in a skill-gap recommendation.
    #[serde(default = "default_max_skill_gap_topics")]
    pub max_skill_gap_topics: usize,
    /// Completion fraction below which study habits are flagged.
    #[serde(default = "default_completion_rate_floor")]
    pub completion_rate_floor: f64,
    /// Average minutes per assessment below which time investment is flagged.
    #[serde(default = "default_min_avg_time_minutes")]
    pub min_avg_time_minutes: f64,
}

fn default_weak_threshold() -> f64 {
    70.0
}
fn default_strong_threshold() -> f64 {
    85.0
}
fn default_top_n() -> usize {
    5
}
fn default_trend_min_points() -> usize {
    MIN_TREND_POINTS
}
fn default_prediction_min_points() -> usize {
    3
}
fn default_prediction_window() -> usize {
    RECENCY_WEIGHTS.len()
}
fn default_max_skill_gap_topics() -> usize {
    3
}
fn default_completion_rate_floor() -> f64 {
    0.7
}
fn default_min_avg_time_minutes() -> f64 {
    20.0
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            weak_threshold: default_weak_threshold(),
            strong_threshold: default_strong_threshold(),
            top_n: default_top_n(),
            trend_min_points: default_trend_min_points(),
            prediction_min_points: default_prediction_min_points(),
            prediction_window: default_prediction_window(),
            max_skill_gap_topics: default_max_skill_gap_topics(),
            completion_rate_floor: default_completion_rate_floor(),
            min_avg_time_minutes: default_min_avg_time_minutes(),
        }
    }
}

impl AnalyzerConfig {
    pub fn prediction_params(&self) -> PredictionParams {
        PredictionParams {
            min_points: self.prediction_min_points,
            window: self.prediction_window,
            trend_min_points: self.trend_min_points,
        }
    }

    pub fn recommendation_rules(&self) -> RecommendationRules {
        RecommendationRules {
            max_skill_gap_topics: self.max_skill_gap_topics,
            completion_rate_floor: self.completion_rate_floor,
            min_avg_time_minutes: self.min_avg_time_minutes,
        }
    }

    /// Reject settings that would make the analysis meaningless.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.weak_threshold <= self.strong_threshold,
            "weak_threshold ({}) must not exceed strong_threshold ({})",
            self.weak_threshold,
            self.strong_threshold
        );
        anyhow::ensure!(
            (1..=RECENCY_WEIGHTS.len()).contains(&self.prediction_window),
            "prediction_window must be between 1 and {}",
            RECENCY_WEIGHTS.len()
        );
        anyhow::ensure!(
            self.trend_min_points >= 2,
            "trend_min_points must be at least 2"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.completion_rate_floor),
            "completion_rate_floor is a fraction between 0.0 and 1.0"
        );
        Ok(())
    }
}

/// Top-level learnlens configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnlensConfig {
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    /// Directory holding the students / assessments / study_sessions tables.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory reports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Max concurrent per-student reports in batch mode.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./learnlens-reports")
}
fn default_parallelism() -> usize {
    4
}

impl Default for LearnlensConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            parallelism: default_parallelism(),
        }
    }
}

impl LearnlensConfig {
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.parallelism >= 1, "parallelism must be at least 1");
        self.analyzer.validate()
    }
}

/// Expand `${VAR_NAME}` references from the environment. Unset variables
/// expand to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut cursor = 0;
    while let Some(offset) = result[cursor..].find("${") {
        let start = cursor + offset;
        let Some(len) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + len];
        let value = std::env::var(var_name).unwrap_or_default();
        result.replace_range(start..start + len + 1, &value);
        // Substituted text is never expanded again.
        cursor = start + value.len();
    }
    result
}

fn resolve_path(p: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&p.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `learnlens.toml` in the current directory
/// 2. `~/.config/learnlens/config.toml`
///
/// Environment overrides: `LEARNLENS_DATA_DIR`, `LEARNLENS_OUTPUT_DIR`.
pub fn load_config() -> Result<LearnlensConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<LearnlensConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("learnlens.toml");
            if local.exists() {
                Some(local)
            } else {
                config_home()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LearnlensConfig::default(),
    };

    if let Ok(dir) = std::env::var("LEARNLENS_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Ok(dir) = std::env::var("LEARNLENS_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }

    config.data_dir = resolve_path(&config.data_dir);
    config.output_dir = resolve_path(&config.output_dir);
    config.validate()?;

    Ok(config)
}

/// Parse a TOML config string.
pub fn parse_config(content: &str) -> Result<LearnlensConfig> {
    let config: LearnlensConfig = toml::from_str(content)?;
    Ok(config)
}

fn config_home() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("learnlens"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_LEARNLENS_TEST_VAR", "school");
        assert_eq!(resolve_env_vars("${_LEARNLENS_TEST_VAR}"), "school");
        assert_eq!(
            resolve_env_vars("/srv/${_LEARNLENS_TEST_VAR}/data"),
            "/srv/school/data"
        );
        assert_eq!(resolve_env_vars("no vars here"), "no vars here");
        std::env::remove_var("_LEARNLENS_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_reexpand_values() {
        std::env::set_var("_LEARNLENS_SELF_REF", "${_LEARNLENS_SELF_REF}");
        std::env::set_var("_LEARNLENS_TERM", "term-1");
        assert_eq!(
            resolve_env_vars("/data/${_LEARNLENS_SELF_REF}/${_LEARNLENS_TERM}"),
            "/data/${_LEARNLENS_SELF_REF}/term-1"
        );
        std::env::remove_var("_LEARNLENS_SELF_REF");
        std::env::remove_var("_LEARNLENS_TERM");
    }

    #[test]
    fn default_config() {
        let config = LearnlensConfig::default();
        assert_eq!(config.parallelism, 4);
        assert_eq!(config.analyzer.weak_threshold, 70.0);
        assert_eq!(config.analyzer.strong_threshold, 85.0);
        assert_eq!(config.analyzer.top_n, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_analyzer_table_keeps_defaults() {
        let config = parse_config(
            r#"
data_dir = "./school-data"

[analyzer]
weak_threshold = 60.0
"#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./school-data"));
        assert_eq!(config.analyzer.weak_threshold, 60.0);
        assert_eq!(config.analyzer.strong_threshold, 85.0);
        assert_eq!(config.analyzer.prediction_window, 5);
    }

    #[test]
    fn overlapping_thresholds_rejected() {
        let mut config = LearnlensConfig::default();
        config.analyzer.weak_threshold = 90.0;
        assert!(config.validate().is_err());

        let mut config = LearnlensConfig::default();
        config.analyzer.prediction_window = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/learnlens.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}

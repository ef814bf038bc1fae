//! Recency-weighted forecast of a student's next score in one subject.

use serde::{Deserialize, Serialize};

use crate::model::{Confidence, Level, TrendLabel};
use crate::statistics::{round2, sample_std, trend_label};

/// Recency weights, oldest first. Shorter windows use a suffix of this
/// vector, renormalized to sum to 1.
pub const RECENCY_WEIGHTS: [f64; 5] = [0.1, 0.15, 0.2, 0.25, 0.3];

/// Forecast for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub subject: String,
    /// Weighted next-score estimate, rounded to two decimals. Absent when
    /// the history is too short.
    pub prediction: Option<f64>,
    pub confidence: Confidence,
    /// Trend over the full subject history, not just the recent window.
    pub recent_trend: TrendLabel,
    /// Number of observations the forecast was based on.
    pub observations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Parameters for [`predict_next_score`].
#[derive(Debug, Clone, Copy)]
pub struct PredictionParams {
    /// Minimum history length for a numeric forecast.
    pub min_points: usize,
    /// How many of the most recent scores are weighted (at most 5).
    pub window: usize,
    /// Minimum history length for the attached trend label.
    pub trend_min_points: usize,
}

impl Default for PredictionParams {
    fn default() -> Self {
        Self {
            min_points: 3,
            window: RECENCY_WEIGHTS.len(),
            trend_min_points: crate::statistics::MIN_TREND_POINTS,
        }
    }
}

/// Weights applied to the last `len` observations, oldest first.
pub fn recency_weights(len: usize) -> Vec<f64> {
    let len = len.min(RECENCY_WEIGHTS.len());
    let suffix = &RECENCY_WEIGHTS[RECENCY_WEIGHTS.len() - len..];
    let total: f64 = suffix.iter().sum();
    suffix.iter().map(|w| w / total).collect()
}

/// Confidence bucket for the dispersion of the recent window.
pub fn confidence_for_std(std: f64) -> Confidence {
    if std < 5.0 {
        Level::High
    } else if std < 10.0 {
        Level::Medium
    } else {
        Level::Low
    }
}

/// Forecast the next score from a date-ordered score history.
pub fn predict_next_score(subject: &str, scores: &[f64], params: &PredictionParams) -> Prediction {
    let recent_trend = trend_label(scores, params.trend_min_points);

    if scores.len() < params.min_points.max(1) {
        tracing::debug!(
            subject,
            observations = scores.len(),
            "insufficient history for prediction"
        );
        return Prediction {
            subject: subject.to_string(),
            prediction: None,
            confidence: Level::Low,
            recent_trend,
            observations: scores.len(),
            message: Some("Insufficient data".to_string()),
        };
    }

    let window = params.window.clamp(1, RECENCY_WEIGHTS.len());
    let recent = &scores[scores.len().saturating_sub(window)..];
    let weights = recency_weights(recent.len());
    let predicted: f64 = recent.iter().zip(&weights).map(|(s, w)| s * w).sum();

    // A single-score window has no spread to measure.
    let spread = sample_std(recent).unwrap_or(0.0);

    Prediction {
        subject: subject.to_string(),
        prediction: Some(round2(predicted)),
        confidence: confidence_for_std(spread),
        recent_trend,
        observations: scores.len(),
        message: None,
    }
}

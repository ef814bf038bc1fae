//! Grouped aggregate statistics and least-squares trend estimation.
//!
//! Groups are built in a single pass with running sum / sum-of-squares /
//! count per key. Standard deviations are sample deviations (Bessel's
//! correction) everywhere in the crate.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::model::TrendLabel;

/// Minimum series length for a trend fit.
pub const MIN_TREND_POINTS: usize = 5;

/// Running accumulator for one group.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: usize,
    sum: f64,
    sum_sq: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    fn finish(&self) -> GroupStats {
        let n = self.count as f64;
        // Summation error can put `sum / n` an ulp outside the observed range.
        let mean = (self.sum / n).clamp(self.min, self.max);
        let std = if self.count < 2 {
            None
        } else {
            // Clamp tiny negative variances from cancellation.
            let var = ((self.sum_sq - n * mean * mean) / (n - 1.0)).max(0.0);
            Some(var.sqrt())
        };
        GroupStats {
            mean,
            std,
            count: self.count,
            min: self.min,
            max: self.max,
        }
    }
}

/// Aggregate statistics over one group of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub mean: f64,
    /// Sample standard deviation; absent for groups of one.
    pub std: Option<f64>,
    pub count: usize,
    pub min: f64,
    pub max: f64,
}

impl GroupStats {
    /// Statistics over a whole slice, or `None` when it is empty.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut acc = Accumulator::default();
        for &v in values {
            acc.push(v);
        }
        Some(acc.finish())
    }
}

/// Group `records` by `key` and aggregate `value` per group.
///
/// Groups appear in first-seen order. Empty input yields an empty result;
/// a key never appears without at least one value behind it.
pub fn group_stats<T, K, FK, FV>(records: &[T], key: FK, value: FV) -> Vec<(K, GroupStats)>
where
    K: Eq + Hash + Clone,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> f64,
{
    group_stats_iter(records.iter(), key, value)
}

/// Iterator form of [`group_stats`], for pre-filtered record streams.
pub fn group_stats_iter<'a, T, K, FK, FV, I>(records: I, key: FK, value: FV) -> Vec<(K, GroupStats)>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    K: Eq + Hash + Clone,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> f64,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Accumulator)> = Vec::new();

    for record in records {
        let k = key(record);
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, Accumulator::default()));
            groups.len() - 1
        });
        groups[slot].1.push(value(record));
    }

    groups
        .into_iter()
        .map(|(k, acc)| (k, acc.finish()))
        .collect()
}

/// Median of a slice, or `None` when it is empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sample standard deviation, or `None` for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    GroupStats::of(values).and_then(|s| s.std)
}

/// Ordinary least-squares slope of `ys` against positions `0, 1, 2, ...`.
///
/// Returns `None` for fewer than two points.
pub fn ols_slope(ys: &[f64]) -> Option<f64> {
    if ys.len() < 2 {
        return None;
    }
    let n = ys.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = ys.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in ys.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    Some(num / den)
}

const SLOPE_SCALE: f64 = 1e9;

/// Map a fitted slope (score points per assessment) onto a trend label.
///
/// `0.5` and `-0.5` sit inside the moderate/slight bands; `±0.1` are stable.
/// The slope is snapped to nine decimals first so fits that land on a band
/// edge up to rounding noise are classified by the edge itself.
pub fn classify_slope(slope: f64) -> TrendLabel {
    let slope = (slope * SLOPE_SCALE).round() / SLOPE_SCALE;
    if slope > 0.5 {
        TrendLabel::StrongImprovement
    } else if slope > 0.1 {
        TrendLabel::ModerateImprovement
    } else if slope >= -0.1 {
        TrendLabel::Stable
    } else if slope >= -0.5 {
        TrendLabel::SlightDecline
    } else {
        TrendLabel::NeedsAttention
    }
}

/// Trend label for a time-ordered score series.
///
/// Series shorter than `min_points` short-circuit to `InsufficientData`
/// without fitting.
pub fn trend_label(scores: &[f64], min_points: usize) -> TrendLabel {
    if scores.len() < min_points.max(2) {
        return TrendLabel::InsufficientData;
    }
    match ols_slope(scores) {
        Some(slope) => classify_slope(slope),
        None => TrendLabel::InsufficientData,
    }
}

/// Round to two decimal places for report output.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_stats_matches_hand_computation() {
        let rows = vec![("a", 10.0), ("b", 4.0), ("a", 20.0), ("a", 30.0)];
        let groups = group_stats(&rows, |r| r.0, |r| r.1);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "a");
        let a = groups[0].1;
        assert_eq!(a.count, 3);
        assert!((a.mean - 20.0).abs() < 1e-9);
        assert!((a.std.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(a.min, 10.0);
        assert_eq!(a.max, 30.0);

        let b = groups[1].1;
        assert_eq!(b.count, 1);
        assert_eq!(b.std, None);
    }

    #[test]
    fn group_stats_with_tuple_keys() {
        let rows = vec![
            ("Math", "Algebra", 60.0),
            ("Math", "Geometry", 90.0),
            ("Math", "Algebra", 80.0),
        ];
        let groups = group_stats(&rows, |r| (r.0, r.1), |r| r.2);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, ("Math", "Algebra"));
        assert!((groups[0].1.mean - 70.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_has_no_groups() {
        let rows: Vec<(&str, f64)> = vec![];
        assert!(group_stats(&rows, |r| r.0, |r| r.1).is_empty());
        assert!(GroupStats::of(&[]).is_none());
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn slope_of_evenly_spaced_scores() {
        let slope = ols_slope(&[50.0, 55.0, 60.0, 65.0, 70.0]).unwrap();
        assert!((slope - 5.0).abs() < 1e-9);
        assert_eq!(ols_slope(&[42.0]), None);
    }

    #[test]
    fn slope_boundaries_fall_on_documented_sides() {
        assert_eq!(classify_slope(0.51), TrendLabel::StrongImprovement);
        assert_eq!(classify_slope(0.5), TrendLabel::ModerateImprovement);
        assert_eq!(classify_slope(0.11), TrendLabel::ModerateImprovement);
        assert_eq!(classify_slope(0.1), TrendLabel::Stable);
        assert_eq!(classify_slope(0.0), TrendLabel::Stable);
        assert_eq!(classify_slope(-0.1), TrendLabel::Stable);
        assert_eq!(classify_slope(-0.11), TrendLabel::SlightDecline);
        assert_eq!(classify_slope(-0.5), TrendLabel::SlightDecline);
        assert_eq!(classify_slope(-0.51), TrendLabel::NeedsAttention);
    }

    #[test]
    fn fitted_series_on_band_edges() {
        let rising = [70.0, 70.1, 70.2, 70.3, 70.4];
        let falling = [70.4, 70.3, 70.2, 70.1, 70.0];
        assert_eq!(trend_label(&rising, MIN_TREND_POINTS), TrendLabel::Stable);
        assert_eq!(trend_label(&falling, MIN_TREND_POINTS), TrendLabel::Stable);

        let rising = [70.0, 70.5, 71.0, 71.5, 72.0];
        let falling = [72.0, 71.5, 71.0, 70.5, 70.0];
        assert_eq!(
            trend_label(&rising, MIN_TREND_POINTS),
            TrendLabel::ModerateImprovement
        );
        assert_eq!(
            trend_label(&falling, MIN_TREND_POINTS),
            TrendLabel::SlightDecline
        );
    }

    #[test]
    fn mean_stays_within_observed_range() {
        for values in [vec![0.1; 3], vec![0.7; 7], vec![33.3; 9], vec![0.1, 0.2, 0.3]] {
            let stats = GroupStats::of(&values).unwrap();
            assert!(
                stats.min <= stats.mean && stats.mean <= stats.max,
                "{values:?} -> {stats:?}"
            );
        }
    }

    #[test]
    fn short_series_is_insufficient() {
        assert_eq!(
            trend_label(&[10.0, 90.0, 10.0, 90.0], MIN_TREND_POINTS),
            TrendLabel::InsufficientData
        );
        assert_eq!(
            trend_label(&[90.0, 80.0, 70.0, 60.0, 50.0], MIN_TREND_POINTS),
            TrendLabel::NeedsAttention
        );
        assert_eq!(
            trend_label(&[70.0; 6], MIN_TREND_POINTS),
            TrendLabel::Stable
        );
    }

    #[test]
    fn round2_rounds_half_away() {
        assert_eq!(round2(71.3333), 71.33);
        assert_eq!(round2(2.005_1), 2.01);
    }
}

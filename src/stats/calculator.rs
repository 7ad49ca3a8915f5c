//! Statistics Calculator Module
//! Handles percentile, box-plot and descriptive statistics computations.

use crate::data::TimeSeries;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Whisker reach, in interquartile ranges beyond the box.
pub const WHISKER_IQR_FACTOR: f64 = 1.5;

/// Five-number summary plus outliers for one box-plot group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub mean: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

/// Descriptive statistics for a whole series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Sort values ascending; NaNs compare equal.
    pub fn sorted(values: &[f64]) -> Vec<f64> {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted
    }

    /// Calculate quantile `q` (0..=1) using linear interpolation (NumPy compatible).
    pub fn quantile(sorted_values: &[f64], q: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Compute the box-and-whisker summary for a group of values.
    ///
    /// Whiskers reach the most extreme observations within
    /// [`WHISKER_IQR_FACTOR`] IQRs of the box; everything beyond is an outlier.
    pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
        if values.is_empty() {
            return None;
        }

        let sorted = Self::sorted(values);
        let q1 = Self::quantile(&sorted, 0.25);
        let median = Self::quantile(&sorted, 0.5);
        let q3 = Self::quantile(&sorted, 0.75);
        let reach = WHISKER_IQR_FACTOR * (q3 - q1);
        let (low_fence, high_fence) = (q1 - reach, q3 + reach);

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < low_fence || v > high_fence)
            .collect();

        Some(BoxSummary {
            count: sorted.len(),
            mean: sorted.iter().mean(),
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
        })
    }

    /// Compute box summaries for independent groups in parallel.
    ///
    /// Output order matches input order.
    pub fn box_summaries_parallel(groups: &[Vec<f64>]) -> Vec<Option<BoxSummary>> {
        groups
            .par_iter()
            .map(|values| Self::box_summary(values))
            .collect()
    }

    /// Descriptive statistics for a whole series.
    pub fn series_summary(series: &TimeSeries) -> SeriesSummary {
        let values = series.values();
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        SeriesSummary {
            count: values.len(),
            mean: values.iter().mean(),
            std_dev: values.iter().std_dev(),
            min,
            max,
            first_date: series.first_date(),
            last_date: series.last_date(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(StatsCalculator::quantile(&sorted, 0.0), 1.0);
        assert_eq!(StatsCalculator::quantile(&sorted, 1.0), 4.0);
        assert!((StatsCalculator::quantile(&sorted, 0.5) - 2.5).abs() < 1e-12);
        assert!((StatsCalculator::quantile(&sorted, 0.25) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn quantile_of_empty_is_nan() {
        assert!(StatsCalculator::quantile(&[], 0.5).is_nan());
        assert_eq!(StatsCalculator::quantile(&[7.0], 0.975), 7.0);
    }

    #[test]
    fn box_summary_separates_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 100.0];
        let summary = StatsCalculator::box_summary(&values).unwrap();

        assert_eq!(summary.count, 9);
        assert_eq!(summary.q1, 3.0);
        assert_eq!(summary.median, 5.0);
        assert_eq!(summary.q3, 7.0);
        assert_eq!(summary.whisker_low, 1.0);
        assert_eq!(summary.whisker_high, 8.0);
        assert_eq!(summary.outliers, vec![100.0]);
        assert!((summary.mean - 136.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn box_summary_of_empty_group_is_none() {
        assert!(StatsCalculator::box_summary(&[]).is_none());
    }

    #[test]
    fn parallel_summaries_keep_group_order() {
        let groups = vec![vec![1.0, 2.0, 3.0], Vec::new(), vec![10.0]];
        let summaries = StatsCalculator::box_summaries_parallel(&groups);

        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].as_ref().map(|s| s.median), Some(2.0));
        assert!(summaries[1].is_none());
        assert_eq!(summaries[2].as_ref().map(|s| s.median), Some(10.0));
    }
}

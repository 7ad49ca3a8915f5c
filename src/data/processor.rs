//! Data Processor Module
//! Handles outlier trimming and calendar aggregation (group-by and unstack).

use super::series::{SeriesError, TimeSeries, DATE_COLUMN, VALUE_COLUMN};
use crate::stats::StatsCalculator;
use chrono::Datelike;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const YEAR_COLUMN: &str = "year";
pub const MONTH_COLUMN: &str = "month";
const MEAN_COLUMN: &str = "mean_value";

/// Full English month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Three-letter month abbreviations, Jan first.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Invalid series: {0}")]
    SeriesError(#[from] SeriesError),
    #[error("Invalid quantile band [{lower}, {upper}]")]
    InvalidBand { lower: f64, upper: f64 },
    #[error("No observations left within [{lower}, {upper}]")]
    EmptySeries { lower: f64, upper: f64 },
    #[error("Cleaned series covers {0} day(s); at least 2 are required")]
    InsufficientData(usize),
}

/// Quantile fractions bounding the retained values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileBand {
    pub lower: f64,
    pub upper: f64,
}

impl Default for QuantileBand {
    fn default() -> Self {
        Self {
            lower: 0.025,
            upper: 0.975,
        }
    }
}

impl QuantileBand {
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.lower)
            && (0.0..=1.0).contains(&self.upper)
            && self.lower <= self.upper
    }
}

/// Value bounds computed from a [`QuantileBand`] over the unfiltered series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueBounds {
    pub lower: f64,
    pub upper: f64,
}

impl ValueBounds {
    /// Inclusive on both ends.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Mean page views for one (year, month) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyMean {
    pub year: i32,
    /// 1 = January.
    pub month: u32,
    pub mean: f64,
}

/// Monthly means reshaped to one row per year and one column per month.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyTable {
    pub years: Vec<i32>,
    pub rows: Vec<[Option<f64>; 12]>,
}

impl MonthlyTable {
    pub fn get(&self, year: i32, month: u32) -> Option<f64> {
        let row = self.years.iter().position(|&y| y == year)?;
        let col = usize::try_from(month).ok()?.checked_sub(1)?;
        self.rows.get(row)?.get(col).copied().flatten()
    }

    /// Largest mean in the table, if any cell is filled.
    pub fn max_mean(&self) -> Option<f64> {
        self.rows
            .iter()
            .flat_map(|row| row.iter().flatten().copied())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
    }
}

/// Year and month-abbreviation tag for one observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalendarTag {
    pub year: i32,
    /// One of [`MONTH_ABBREVIATIONS`].
    pub month: &'static str,
    pub value: f64,
}

/// Handles data cleaning and transformation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Compute the value bounds for `band` over the full series.
    pub fn quantile_bounds(
        series: &TimeSeries,
        band: QuantileBand,
    ) -> Result<ValueBounds, ProcessorError> {
        if !band.is_valid() {
            return Err(ProcessorError::InvalidBand {
                lower: band.lower,
                upper: band.upper,
            });
        }

        let sorted = StatsCalculator::sorted(&series.values());
        Ok(ValueBounds {
            lower: StatsCalculator::quantile(&sorted, band.lower),
            upper: StatsCalculator::quantile(&sorted, band.upper),
        })
    }

    /// Drop observations outside the quantile band of the unfiltered series.
    ///
    /// Bounds are inclusive. Fails when fewer than two days survive.
    pub fn trim_outliers(
        series: &TimeSeries,
        band: QuantileBand,
    ) -> Result<(TimeSeries, ValueBounds), ProcessorError> {
        let bounds = Self::quantile_bounds(series, band)?;

        let filtered = series
            .dataframe()
            .clone()
            .lazy()
            .filter(
                col(VALUE_COLUMN)
                    .cast(DataType::Float64)
                    .gt_eq(lit(bounds.lower))
                    .and(col(VALUE_COLUMN).cast(DataType::Float64).lt_eq(lit(bounds.upper))),
            )
            .collect()?;

        match filtered.height() {
            0 => {
                return Err(ProcessorError::EmptySeries {
                    lower: bounds.lower,
                    upper: bounds.upper,
                })
            }
            1 => return Err(ProcessorError::InsufficientData(1)),
            _ => {}
        }

        let cleaned = TimeSeries::from_dataframe(filtered)?;
        debug!(
            lower = bounds.lower,
            upper = bounds.upper,
            kept = cleaned.len(),
            dropped = series.len() - cleaned.len(),
            "trimmed outliers"
        );
        Ok((cleaned, bounds))
    }

    /// Add integer `year` and `month` (1-12) columns derived from `date`.
    pub fn with_calendar_columns(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        let df = df
            .clone()
            .lazy()
            .with_columns([
                col(DATE_COLUMN).dt().year().cast(DataType::Int32).alias(YEAR_COLUMN),
                col(DATE_COLUMN).dt().month().cast(DataType::Int32).alias(MONTH_COLUMN),
            ])
            .collect()?;
        Ok(df)
    }

    /// Mean value for every (year, month) pair, sorted chronologically.
    pub fn monthly_means(series: &TimeSeries) -> Result<Vec<MonthlyMean>, ProcessorError> {
        let grouped = Self::with_calendar_columns(series.dataframe())?
            .lazy()
            .group_by([col(YEAR_COLUMN), col(MONTH_COLUMN)])
            .agg([col(VALUE_COLUMN)
                .cast(DataType::Float64)
                .mean()
                .alias(MEAN_COLUMN)])
            .sort([YEAR_COLUMN, MONTH_COLUMN], SortMultipleOptions::default())
            .collect()?;

        let years = grouped.column(YEAR_COLUMN)?.i32()?;
        let months = grouped.column(MONTH_COLUMN)?.i32()?;
        let means = grouped.column(MEAN_COLUMN)?.f64()?;

        let result = years
            .into_iter()
            .zip(months.into_iter())
            .zip(means.into_iter())
            .filter_map(|((year, month), mean)| {
                Some(MonthlyMean {
                    year: year?,
                    month: u32::try_from(month?).ok()?,
                    mean: mean?,
                })
            })
            .collect();
        Ok(result)
    }

    /// Reshape monthly means into a year x month table (unstack on month).
    pub fn unstack_by_month(means: &[MonthlyMean]) -> MonthlyTable {
        let mut table = MonthlyTable::default();
        for m in means {
            let row = match table.years.iter().position(|&y| y == m.year) {
                Some(row) => row,
                None => {
                    table.years.push(m.year);
                    table.rows.push([None; 12]);
                    table.rows.len() - 1
                }
            };
            if let Some(cell) = (m.month as usize)
                .checked_sub(1)
                .and_then(|col| table.rows[row].get_mut(col))
            {
                *cell = Some(m.mean);
            }
        }

        // Keep rows in ascending year order regardless of input order
        let mut order: Vec<usize> = (0..table.years.len()).collect();
        order.sort_by_key(|&i| table.years[i]);
        MonthlyTable {
            years: order.iter().map(|&i| table.years[i]).collect(),
            rows: order.iter().map(|&i| table.rows[i]).collect(),
        }
    }

    /// Tag each observation with its year and month abbreviation.
    pub fn calendar_tags(series: &TimeSeries) -> Vec<CalendarTag> {
        series
            .observations()
            .iter()
            .map(|o| CalendarTag {
                year: o.date.year(),
                month: MONTH_ABBREVIATIONS[o.date.month0() as usize],
                value: o.value as f64,
            })
            .collect()
    }
}

//! Time Series Module
//! Date-keyed daily observations backed by a Polars DataFrame.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

/// Column holding the calendar date of each observation.
pub const DATE_COLUMN: &str = "date";
/// Column holding the page-view count of each observation.
pub const VALUE_COLUMN: &str = "value";

/// Days from 0001-01-01 (CE day 1) to 1970-01-01, Polars' `Date` origin.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing date in row {0}")]
    NullDate(usize),
    #[error("Missing value in row {0}")]
    NullValue(usize),
    #[error("Date out of range: {0} days from 1970-01-01")]
    DateOutOfRange(i32),
    #[error("Negative page-view count {value} on {date}")]
    NegativeValue { date: NaiveDate, value: i64 },
    #[error("Duplicate observation for {0}")]
    DuplicateDate(NaiveDate),
    #[error("Page-view count {value} in row {row} is not a whole number")]
    FractionalValue { row: usize, value: f64 },
    #[error("Page-view count {0} does not fit in a signed 64-bit column")]
    ValueOutOfRange(u64),
}

/// One day's page-view count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: u64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: u64) -> Self {
        Self { date, value }
    }
}

/// Observations ordered by date, one per day.
///
/// The DataFrame (`date: Date`, `value: Int64`) feeds lazy Polars queries;
/// the typed observations feed the chart builders. Both views always hold
/// the same rows in the same order.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    df: DataFrame,
    observations: Vec<Observation>,
}

impl PartialEq for TimeSeries {
    fn eq(&self, other: &Self) -> bool {
        self.observations == other.observations
    }
}

impl TimeSeries {
    /// Build a series from a frame with `date` and `value` columns.
    ///
    /// Rows are sorted by date. Null cells, fractional or negative counts
    /// and repeated dates are rejected.
    pub fn from_dataframe(df: DataFrame) -> Result<Self, SeriesError> {
        ensure_whole_counts(df.column(VALUE_COLUMN)?)?;

        let df = df
            .lazy()
            .select([
                col(DATE_COLUMN).cast(DataType::Date),
                col(VALUE_COLUMN).strict_cast(DataType::Int64),
            ])
            .sort([DATE_COLUMN], SortMultipleOptions::default())
            .collect()?;

        let day_column = df.column(DATE_COLUMN)?.cast(&DataType::Int32)?;
        let days = day_column.i32()?;
        let values = df.column(VALUE_COLUMN)?.i64()?;

        let mut observations: Vec<Observation> = Vec::with_capacity(df.height());
        for (row, (day, value)) in days.into_iter().zip(values.into_iter()).enumerate() {
            let day = day.ok_or(SeriesError::NullDate(row))?;
            let value = value.ok_or(SeriesError::NullValue(row))?;
            let date = date_from_epoch_days(day)?;
            let count =
                u64::try_from(value).map_err(|_| SeriesError::NegativeValue { date, value })?;

            if observations.last().is_some_and(|prev| prev.date == date) {
                return Err(SeriesError::DuplicateDate(date));
            }
            observations.push(Observation::new(date, count));
        }

        Ok(Self { df, observations })
    }

    /// Build a series from in-memory observations (any order).
    pub fn from_observations(observations: &[Observation]) -> Result<Self, SeriesError> {
        let days: Vec<i32> = observations
            .iter()
            .map(|o| epoch_days_from_date(o.date))
            .collect();
        let values = observations
            .iter()
            .map(|o| i64::try_from(o.value).map_err(|_| SeriesError::ValueOutOfRange(o.value)))
            .collect::<Result<Vec<i64>, _>>()?;

        let df = DataFrame::new(vec![
            Column::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?,
            Column::new(VALUE_COLUMN.into(), values),
        ])?;

        Self::from_dataframe(df)
    }

    /// Get a reference to the backing DataFrame.
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Page-view counts as floats, in date order.
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value as f64).collect()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }
}

/// Float counts must be whole; `strict_cast` to Int64 would truncate them.
fn ensure_whole_counts(values: &Column) -> Result<(), SeriesError> {
    if !values.dtype().is_float() {
        return Ok(());
    }

    let floats = values.cast(&DataType::Float64)?;
    for (row, value) in floats.f64()?.into_iter().enumerate() {
        if let Some(value) = value {
            if !value.is_finite() || value.fract() != 0.0 {
                return Err(SeriesError::FractionalValue { row, value });
            }
        }
    }
    Ok(())
}

fn date_from_epoch_days(days: i32) -> Result<NaiveDate, SeriesError> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or(SeriesError::DateOutOfRange(days))
}

pub(crate) fn epoch_days_from_date(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

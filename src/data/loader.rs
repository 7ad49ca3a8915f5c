//! CSV Data Loader Module
//! Handles CSV file loading and date parsing using Polars.

use super::series::{epoch_days_from_date, SeriesError, TimeSeries, DATE_COLUMN, VALUE_COLUMN};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Expected layout of the `date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp layouts also accepted in the `date` column; the time is dropped.
pub const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("CSV file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("Invalid series: {0}")]
    InvalidSeries(#[from] SeriesError),
    #[error("Unparseable date '{value}' in row {row}")]
    MalformedDate { row: usize, value: String },
    #[error("No data loaded")]
    NoData,
}

/// Handles CSV file loading with Polars.
#[derive(Debug, Default)]
pub struct DataLoader {
    file_path: Option<PathBuf>,
    row_count: usize,
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            file_path: None,
            row_count: 0,
        }
    }

    /// Load a `date,value` CSV file into a date-keyed series.
    ///
    /// Dates must match [`DATE_FORMAT`] or one of [`DATETIME_FORMATS`]; any
    /// unparseable date fails the whole load. Rows with an empty `value`
    /// cell are skipped.
    pub fn load_csv(&mut self, file_path: impl AsRef<Path>) -> Result<TimeSeries, LoaderError> {
        let path = file_path.as_ref();
        self.file_path = Some(path.to_path_buf());

        if !path.is_file() {
            return Err(LoaderError::FileNotFound(path.to_path_buf()));
        }

        let raw = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        for name in [DATE_COLUMN, VALUE_COLUMN] {
            if raw.column(name).is_err() {
                return Err(LoaderError::MissingColumn(name));
            }
        }
        if raw.height() == 0 {
            return Err(LoaderError::NoData);
        }
        self.row_count = raw.height();
        debug!(path = %path.display(), rows = raw.height(), "read raw CSV");

        let mut parsed = raw
            .lazy()
            .filter(col(VALUE_COLUMN).is_not_null())
            .select([col(DATE_COLUMN).cast(DataType::String), col(VALUE_COLUMN)])
            .collect()?;

        let days = parsed
            .column(DATE_COLUMN)?
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, text)| {
                text.map(|text| {
                    parse_date(text)
                        .map(epoch_days_from_date)
                        .ok_or_else(|| LoaderError::MalformedDate {
                            row,
                            value: text.to_string(),
                        })
                })
                .transpose()
            })
            .collect::<Result<Vec<Option<i32>>, _>>()?;
        parsed.with_column(Column::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?)?;

        let series = TimeSeries::from_dataframe(parsed)?;
        if series.is_empty() {
            return Err(LoaderError::NoData);
        }

        info!(
            path = %path.display(),
            observations = series.len(),
            "loaded page-view series"
        );
        Ok(series)
    }

    /// Number of rows in the most recently read file, before parsing.
    pub fn get_row_count(&self) -> usize {
        self.row_count
    }

    /// Get file path.
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }
}

/// Parse a calendar date, or the date part of an ISO timestamp.
fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok().or_else(|| {
        DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(|timestamp| timestamp.date())
    })
}

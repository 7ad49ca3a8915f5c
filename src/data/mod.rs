//! Data module - CSV loading, cleaning and calendar aggregation

mod loader;
mod processor;
mod series;

pub use loader::{DataLoader, LoaderError, DATETIME_FORMATS, DATE_FORMAT};
pub use processor::{
    CalendarTag, DataProcessor, MonthlyMean, MonthlyTable, ProcessorError, QuantileBand,
    ValueBounds, MONTH_ABBREVIATIONS, MONTH_NAMES,
};
pub use series::{Observation, SeriesError, TimeSeries, DATE_COLUMN, VALUE_COLUMN};

//! Stats module - Quantiles, box summaries and descriptive statistics

mod calculator;

pub use calculator::{BoxSummary, SeriesSummary, StatsCalculator, WHISKER_IQR_FACTOR};

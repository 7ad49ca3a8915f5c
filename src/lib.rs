//! Page-view visualizer - daily page-view cleaning & static charts
//!
//! Loads a `date,value` CSV, trims values outside the 2.5th–97.5th
//! percentile band, and renders a line plot, a monthly-average bar plot and
//! a pair of trend/seasonality box plots as PNG files.

pub mod charts;
pub mod config;
pub mod data;
pub mod stats;
pub mod visualizer;

pub use charts::{Figure, Panel};
pub use config::VisualizerConfig;
pub use visualizer::{TimeSeriesVisualizer, VisualizerError};

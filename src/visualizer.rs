//! Visualizer Pipeline
//! Loads the series once, trims outliers once, and hands the cleaned series
//! to each chart routine.

use crate::charts::{ChartPlotter, Figure, RenderError, StaticChartRenderer};
use crate::config::{ConfigError, VisualizerConfig};
use crate::data::{DataLoader, DataProcessor, LoaderError, ProcessorError, TimeSeries, ValueBounds};
use crate::stats::StatsCalculator;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum VisualizerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Cleaned page-view series plus the settings used to chart it.
#[derive(Debug, Clone)]
pub struct TimeSeriesVisualizer {
    config: VisualizerConfig,
    cleaned: TimeSeries,
    bounds: ValueBounds,
}

impl TimeSeriesVisualizer {
    /// Load `config.input_path` and trim it to the configured quantile band.
    pub fn from_config(config: VisualizerConfig) -> Result<Self, VisualizerError> {
        config.validate()?;
        let series = DataLoader::new().load_csv(&config.input_path)?;
        Self::from_series(config, &series)
    }

    /// Trim an already loaded series.
    pub fn from_series(
        config: VisualizerConfig,
        series: &TimeSeries,
    ) -> Result<Self, VisualizerError> {
        config.validate()?;

        let raw = StatsCalculator::series_summary(series);
        info!(
            count = raw.count,
            mean = raw.mean,
            std_dev = raw.std_dev,
            "raw series"
        );

        let (cleaned, bounds) = DataProcessor::trim_outliers(series, config.band)?;
        let summary = StatsCalculator::series_summary(&cleaned);
        info!(
            count = summary.count,
            lower = bounds.lower,
            upper = bounds.upper,
            first = ?summary.first_date,
            last = ?summary.last_date,
            "cleaned series"
        );

        Ok(Self {
            config,
            cleaned,
            bounds,
        })
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// The outlier-trimmed series shared by every chart.
    pub fn series(&self) -> &TimeSeries {
        &self.cleaned
    }

    /// Value bounds the series was trimmed to.
    pub fn bounds(&self) -> ValueBounds {
        self.bounds
    }

    /// Render the daily line chart and write it to the line plot path.
    pub fn draw_line_plot(&self) -> Result<Figure, VisualizerError> {
        let data = ChartPlotter::line_data(&self.cleaned);
        let figure = StaticChartRenderer::render_line(&data, self.config.line_canvas)?;
        Self::write(&figure, &self.config.line_plot_path())?;
        Ok(figure)
    }

    /// Render the monthly-mean bar chart and write it to the bar plot path.
    pub fn draw_bar_plot(&self) -> Result<Figure, VisualizerError> {
        let data = ChartPlotter::bar_data(&self.cleaned)?;
        debug!(years = data.table.years.len(), "monthly means computed");
        let figure = StaticChartRenderer::render_bar(&data, self.config.bar_canvas)?;
        Self::write(&figure, &self.config.bar_plot_path())?;
        Ok(figure)
    }

    /// Render the trend/seasonality box plots and write them to the box plot path.
    pub fn draw_box_plot(&self) -> Result<Figure, VisualizerError> {
        let data = ChartPlotter::box_data(&self.cleaned);
        let figure = StaticChartRenderer::render_box(&data, self.config.box_canvas)?;
        Self::write(&figure, &self.config.box_plot_path())?;
        Ok(figure)
    }

    /// Render all three charts in order: line, bar, box.
    pub fn draw_all(&self) -> Result<[Figure; 3], VisualizerError> {
        Ok([
            self.draw_line_plot()?,
            self.draw_bar_plot()?,
            self.draw_box_plot()?,
        ])
    }

    fn write(figure: &Figure, path: &Path) -> Result<(), RenderError> {
        figure.save(path)?;
        let size = figure.size();
        info!(
            path = %path.display(),
            width = size.width,
            height = size.height,
            "chart written"
        );
        Ok(())
    }
}

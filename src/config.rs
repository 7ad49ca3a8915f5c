//! Configuration Module
//! Input/output locations, outlier band and canvas sizes, loadable from JSON.

use crate::data::QuantileBand;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Config file the binary picks up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "visualizer.json";

/// Log filter built from `RUST_LOG`-style directives.
///
/// Directives override the `info` default; invalid ones are skipped.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives.unwrap_or_default())
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Quantile band [{lower}, {upper}] must satisfy 0 <= lower <= upper <= 1")]
    InvalidBand { lower: f64, upper: f64 },
    #[error("Canvas for {0} has zero width or height")]
    EmptyCanvas(&'static str),
    #[error("Output file name for {0} is empty")]
    EmptyFileName(&'static str),
}

/// Pixel dimensions of a rendered chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Runtime settings for the visualizer pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub line_plot_file: String,
    pub bar_plot_file: String,
    pub box_plot_file: String,
    pub band: QuantileBand,
    /// 15x5 inches at 100 dpi.
    pub line_canvas: CanvasSize,
    /// 10x7 inches at 100 dpi.
    pub bar_canvas: CanvasSize,
    /// 15x6 inches at 100 dpi.
    pub box_canvas: CanvasSize,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("fcc-forum-pageviews.csv"),
            output_dir: PathBuf::from("."),
            line_plot_file: "line_plot.png".to_string(),
            bar_plot_file: "bar_plot.png".to_string(),
            box_plot_file: "box_plot.png".to_string(),
            band: QuantileBand::default(),
            line_canvas: CanvasSize::new(1500, 500),
            bar_canvas: CanvasSize::new(1000, 700),
            box_canvas: CanvasSize::new(1500, 600),
        }
    }
}

impl VisualizerConfig {
    /// Read and validate a JSON config; omitted fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.band.is_valid() {
            return Err(ConfigError::InvalidBand {
                lower: self.band.lower,
                upper: self.band.upper,
            });
        }

        for (name, canvas) in [
            ("line plot", self.line_canvas),
            ("bar plot", self.bar_canvas),
            ("box plot", self.box_canvas),
        ] {
            if canvas.is_empty() {
                return Err(ConfigError::EmptyCanvas(name));
            }
        }

        for (name, file) in [
            ("line plot", &self.line_plot_file),
            ("bar plot", &self.bar_plot_file),
            ("box plot", &self.box_plot_file),
        ] {
            if file.trim().is_empty() {
                return Err(ConfigError::EmptyFileName(name));
            }
        }

        Ok(())
    }

    pub fn line_plot_path(&self) -> PathBuf {
        self.output_dir.join(&self.line_plot_file)
    }

    pub fn bar_plot_path(&self) -> PathBuf {
        self.output_dir.join(&self.bar_plot_file)
    }

    pub fn box_plot_path(&self) -> PathBuf {
        self.output_dir.join(&self.box_plot_file)
    }
}

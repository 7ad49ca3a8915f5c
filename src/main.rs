//! Page-view visualizer binary
//!
//! Reads `visualizer.json` from the working directory when present and
//! writes `line_plot.png`, `bar_plot.png` and `box_plot.png`.

use anyhow::Context;
use pageview_visualizer::config::{log_filter, DEFAULT_CONFIG_FILE};
use pageview_visualizer::{TimeSeriesVisualizer, VisualizerConfig};
use std::env;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(log_filter(env::var("RUST_LOG").ok().as_deref()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = if Path::new(DEFAULT_CONFIG_FILE).is_file() {
        VisualizerConfig::load(DEFAULT_CONFIG_FILE)
            .with_context(|| format!("failed to read {}", DEFAULT_CONFIG_FILE))?
    } else {
        VisualizerConfig::default()
    };

    let visualizer = TimeSeriesVisualizer::from_config(config)
        .context("failed to load page-view series")?;

    visualizer.draw_line_plot().context("failed to draw line plot")?;
    visualizer.draw_bar_plot().context("failed to draw bar plot")?;
    visualizer.draw_box_plot().context("failed to draw box plot")?;

    tracing::info!(
        output_dir = %visualizer.config().output_dir.display(),
        "all charts written"
    );
    Ok(())
}

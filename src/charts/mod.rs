//! Charts module - Chart data preparation and static rendering

mod figure;
mod plotter;
mod renderer;

pub use figure::{Figure, Panel};
pub use plotter::{
    BarChartData, BoxChartData, BoxGroup, ChartData, ChartPlotter, LineChartData, LINE_COLOR,
    MONTH_PALETTE,
};
pub use renderer::{
    RenderError, StaticChartRenderer, BAR_LEGEND_TITLE, BAR_TITLE, LINE_TITLE, MONTH_BOX_TITLE,
    YEAR_BOX_TITLE,
};

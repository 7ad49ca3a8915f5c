//! Static Chart Renderer
//! Draws the three page-view charts into in-memory RGB buffers with plotters.
//!
//! Layout:
//! 1. Line plot: daily page views against date
//! 2. Bar plot: monthly means, years as categories, one bar per month
//! 3. Box plot: two panels side by side
//!    - Left: distribution by year (trend)
//!    - Right: distribution by month, Jan..Dec (seasonality)

use super::figure::{Figure, Panel};
use super::plotter::{
    BarChartData, BoxChartData, BoxGroup, ChartData, LineChartData, LINE_COLOR, MONTH_PALETTE,
};
use crate::config::CanvasSize;
use crate::data::MONTH_NAMES;
use chrono::NaiveDate;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use thiserror::Error;

pub const LINE_TITLE: &str = "Daily freeCodeCamp Forum Page Views 5/2016-12/2019";
pub const BAR_TITLE: &str = "Views per Month";
pub const BAR_LEGEND_TITLE: &str = "Months";
pub const YEAR_BOX_TITLE: &str = "Year-wise Box Plot (Trend)";
pub const MONTH_BOX_TITLE: &str = "Month-wise Box Plot (Seasonality)";

const FONT_FAMILY: &str = "sans-serif";
const TITLE_FONT_SIZE: i32 = 22;
const AXIS_FONT_SIZE: i32 = 16;
const LEGEND_FONT_SIZE: i32 = 13;

const MARGIN: i32 = 15;
const X_LABEL_AREA: i32 = 45;
const Y_LABEL_AREA: i32 = 75;

/// Share of a category slot covered by its bars or box.
const BAR_GROUP_WIDTH: f64 = 0.8;
const BOX_WIDTH: f64 = 0.6;
/// Vertical headroom around the data, as a fraction of its span.
const RANGE_PADDING: f64 = 0.05;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing error: {0}")]
    Drawing(String),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not enough data to draw the {0}")]
    NotEnoughData(&'static str),
    #[error("Pixel buffer does not match canvas size")]
    BufferSize,
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(err.to_string())
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Line chart of value vs. date.
    pub fn render_line(data: &LineChartData, size: CanvasSize) -> Result<Figure, RenderError> {
        let (first, last) = match (data.points.first(), data.points.last()) {
            (Some(first), Some(last)) if first.0 < last.0 => (first.0, last.0),
            _ => return Err(RenderError::NotEnoughData("line plot")),
        };
        let (y_min, y_max) = Self::padded_range(data.points.iter().map(|p| p.1));

        let mut pixels = Self::blank_buffer(size);
        {
            let root = BitMapBackend::with_buffer(&mut pixels, (size.width, size.height))
                .into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(LINE_TITLE, (FONT_FAMILY, TITLE_FONT_SIZE))
                .margin(MARGIN)
                .x_label_area_size(X_LABEL_AREA)
                .y_label_area_size(Y_LABEL_AREA)
                .build_cartesian_2d(first..last, y_min..y_max)?;

            chart
                .configure_mesh()
                .x_labels(12)
                .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m").to_string())
                .y_label_formatter(&|v: &f64| format!("{:.0}", v))
                .x_desc("Date")
                .y_desc("Page Views")
                .axis_desc_style((FONT_FAMILY, AXIS_FONT_SIZE))
                .draw()?;

            chart.draw_series(LineSeries::new(
                data.points.iter().copied(),
                LINE_COLOR.stroke_width(1),
            ))?;

            root.present()?;
        }

        let panel = Panel {
            title: LINE_TITLE.to_string(),
            x_label: "Date".to_string(),
            y_label: "Page Views".to_string(),
            categories: Vec::new(),
        };
        Ok(Figure::new(
            size,
            pixels,
            vec![panel],
            Vec::new(),
            ChartData::Line(data.clone()),
        ))
    }

    /// Grouped bar chart of monthly means with a month legend.
    pub fn render_bar(data: &BarChartData, size: CanvasSize) -> Result<Figure, RenderError> {
        let table = &data.table;
        let max_mean = table
            .max_mean()
            .ok_or(RenderError::NotEnoughData("bar plot"))?;
        let year_labels: Vec<String> = table.years.iter().map(|y| y.to_string()).collect();
        let n = year_labels.len();
        let bar_width = BAR_GROUP_WIDTH / MONTH_NAMES.len() as f64;

        let mut pixels = Self::blank_buffer(size);
        {
            let root = BitMapBackend::with_buffer(&mut pixels, (size.width, size.height))
                .into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(BAR_TITLE, (FONT_FAMILY, TITLE_FONT_SIZE))
                .margin(MARGIN)
                .x_label_area_size(X_LABEL_AREA)
                .y_label_area_size(Y_LABEL_AREA)
                .build_cartesian_2d(
                    -0.5f64..(n as f64 - 0.5),
                    0f64..(max_mean * (1.0 + 2.0 * RANGE_PADDING)).max(1.0),
                )?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(n + 1)
                .x_label_formatter(&|x: &f64| Self::category_label(&year_labels, *x))
                .y_label_formatter(&|v: &f64| format!("{:.0}", v))
                .x_desc("Years")
                .y_desc("Average Page Views")
                .axis_desc_style((FONT_FAMILY, AXIS_FONT_SIZE))
                .draw()?;

            // Marker-less first entry acts as the legend title
            chart
                .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())?
                .label(BAR_LEGEND_TITLE)
                .legend(|(x, y)| Rectangle::new([(x, y), (x, y)], WHITE.filled()));

            for (month, name) in MONTH_NAMES.iter().enumerate() {
                let color = MONTH_PALETTE[month];
                let offset = -BAR_GROUP_WIDTH / 2.0 + month as f64 * bar_width;
                let bars = table.rows.iter().enumerate().filter_map(move |(i, row)| {
                    row[month].map(|mean| {
                        let x0 = i as f64 + offset;
                        Rectangle::new([(x0, 0.0), (x0 + bar_width, mean)], color.filled())
                    })
                });

                chart
                    .draw_series(bars)?
                    .label(*name)
                    .legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
                    });
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.85))
                .border_style(BLACK)
                .label_font((FONT_FAMILY, LEGEND_FONT_SIZE))
                .draw()?;

            root.present()?;
        }

        let panel = Panel {
            title: BAR_TITLE.to_string(),
            x_label: "Years".to_string(),
            y_label: "Average Page Views".to_string(),
            categories: year_labels,
        };
        Ok(Figure::new(
            size,
            pixels,
            vec![panel],
            MONTH_NAMES.iter().map(|m| m.to_string()).collect(),
            ChartData::Bar(data.clone()),
        ))
    }

    /// Year-wise and month-wise box plots side by side.
    pub fn render_box(data: &BoxChartData, size: CanvasSize) -> Result<Figure, RenderError> {
        if data.by_year.iter().all(|g| g.values.is_empty()) {
            return Err(RenderError::NotEnoughData("box plot"));
        }
        let y_range = Self::padded_range(
            data.by_year
                .iter()
                .chain(data.by_month.iter())
                .flat_map(|g| g.values.iter().copied()),
        );

        let mut pixels = Self::blank_buffer(size);
        {
            let root = BitMapBackend::with_buffer(&mut pixels, (size.width, size.height))
                .into_drawing_area();
            root.fill(&WHITE)?;

            let areas = root.split_evenly((1, 2));
            Self::draw_box_panel(&areas[0], YEAR_BOX_TITLE, "Year", &data.by_year, y_range)?;
            Self::draw_box_panel(&areas[1], MONTH_BOX_TITLE, "Month", &data.by_month, y_range)?;

            root.present()?;
        }

        let panels = vec![
            Self::box_panel(YEAR_BOX_TITLE, "Year", &data.by_year),
            Self::box_panel(MONTH_BOX_TITLE, "Month", &data.by_month),
        ];
        Ok(Figure::new(
            size,
            pixels,
            panels,
            Vec::new(),
            ChartData::Box(data.clone()),
        ))
    }

    fn draw_box_panel(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        title: &str,
        x_label: &str,
        groups: &[BoxGroup],
        (y_min, y_max): (f64, f64),
    ) -> Result<(), RenderError> {
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        let n = groups.len();

        let mut chart = ChartBuilder::on(area)
            .caption(title, (FONT_FAMILY, AXIS_FONT_SIZE + 2))
            .margin(MARGIN)
            .x_label_area_size(X_LABEL_AREA)
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n + 1)
            .x_label_formatter(&|x: &f64| Self::category_label(&labels, *x))
            .y_label_formatter(&|v: &f64| format!("{:.0}", v))
            .x_desc(x_label)
            .y_desc("Page Views")
            .axis_desc_style((FONT_FAMILY, AXIS_FONT_SIZE))
            .draw()?;

        let half = BOX_WIDTH / 2.0;
        let cap = BOX_WIDTH / 4.0;
        for (i, group) in groups.iter().enumerate() {
            let Some(summary) = &group.summary else {
                continue;
            };
            let x = i as f64;
            let color = MONTH_PALETTE[i % MONTH_PALETTE.len()];

            chart.draw_series([
                Rectangle::new(
                    [(x - half, summary.q1), (x + half, summary.q3)],
                    color.mix(0.75).filled(),
                ),
                Rectangle::new(
                    [(x - half, summary.q1), (x + half, summary.q3)],
                    BLACK.stroke_width(1),
                ),
            ])?;

            chart.draw_series([
                PathElement::new(
                    vec![(x - half, summary.median), (x + half, summary.median)],
                    BLACK.stroke_width(2),
                ),
                PathElement::new(
                    vec![(x, summary.q3), (x, summary.whisker_high)],
                    BLACK.stroke_width(1),
                ),
                PathElement::new(
                    vec![(x, summary.q1), (x, summary.whisker_low)],
                    BLACK.stroke_width(1),
                ),
                PathElement::new(
                    vec![(x - cap, summary.whisker_high), (x + cap, summary.whisker_high)],
                    BLACK.stroke_width(1),
                ),
                PathElement::new(
                    vec![(x - cap, summary.whisker_low), (x + cap, summary.whisker_low)],
                    BLACK.stroke_width(1),
                ),
            ])?;

            chart.draw_series(
                summary
                    .outliers
                    .iter()
                    .map(|&v| Circle::new((x, v), 2, BLACK.stroke_width(1))),
            )?;
        }

        Ok(())
    }

    fn box_panel(title: &str, x_label: &str, groups: &[BoxGroup]) -> Panel {
        Panel {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: "Page Views".to_string(),
            categories: groups.iter().map(|g| g.label.clone()).collect(),
        }
    }

    /// Label for a category tick; ticks between categories stay blank.
    fn category_label<S: AsRef<str>>(labels: &[S], x: f64) -> String {
        let idx = x.round();
        if (x - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels
            .get(idx as usize)
            .map(|l| l.as_ref().to_string())
            .unwrap_or_default()
    }

    fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !min.is_finite() || !max.is_finite() {
            return (0.0, 1.0);
        }
        let pad = ((max - min) * RANGE_PADDING).max(1.0);
        (min - pad, max + pad)
    }

    fn blank_buffer(size: CanvasSize) -> Vec<u8> {
        vec![255u8; size.width as usize * size.height as usize * 3]
    }
}

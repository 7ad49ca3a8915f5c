//! Chart Plotter Module
//! Reshapes the cleaned series into the data each chart draws.

use crate::data::{DataProcessor, MonthlyTable, ProcessorError, TimeSeries, MONTH_ABBREVIATIONS};
use crate::stats::{BoxSummary, StatsCalculator};
use chrono::NaiveDate;
use plotters::style::RGBColor;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Line colour for the daily series
pub const LINE_COLOR: RGBColor = RGBColor(0, 128, 0); // Green

/// One colour per month, January first
pub const MONTH_PALETTE: [RGBColor; 12] = [
    RGBColor(31, 119, 180),  // Blue
    RGBColor(255, 127, 14),  // Orange
    RGBColor(44, 160, 44),   // Green
    RGBColor(214, 39, 40),   // Red
    RGBColor(148, 103, 189), // Purple
    RGBColor(140, 86, 75),   // Brown
    RGBColor(227, 119, 194), // Pink
    RGBColor(127, 127, 127), // Grey
    RGBColor(188, 189, 34),  // Olive
    RGBColor(23, 190, 207),  // Cyan
    RGBColor(174, 199, 232), // Light Blue
    RGBColor(255, 187, 120), // Light Orange
];

/// Daily points in date order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChartData {
    pub points: Vec<(NaiveDate, f64)>,
}

/// Monthly means, years as categories and months as side-by-side bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartData {
    pub table: MonthlyTable,
}

/// Values of one box-plot category with its summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxGroup {
    pub label: String,
    pub values: Vec<f64>,
    /// `None` when the category holds no observations.
    pub summary: Option<BoxSummary>,
}

/// Year-wise (trend) and month-wise (seasonality) box groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxChartData {
    /// Ascending years
    pub by_year: Vec<BoxGroup>,
    /// Always Jan..Dec
    pub by_month: Vec<BoxGroup>,
}

/// Data behind a rendered figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartData {
    Line(LineChartData),
    Bar(BarChartData),
    Box(BoxChartData),
}

/// Builds chart data from a cleaned series.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn line_data(series: &TimeSeries) -> LineChartData {
        LineChartData {
            points: series
                .observations()
                .iter()
                .map(|o| (o.date, o.value as f64))
                .collect(),
        }
    }

    pub fn bar_data(series: &TimeSeries) -> Result<BarChartData, ProcessorError> {
        let means = DataProcessor::monthly_means(series)?;
        Ok(BarChartData {
            table: DataProcessor::unstack_by_month(&means),
        })
    }

    pub fn box_data(series: &TimeSeries) -> BoxChartData {
        let tags = DataProcessor::calendar_tags(series);

        let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
        let mut by_month: HashMap<&str, Vec<f64>> = HashMap::new();
        for tag in &tags {
            by_year.entry(tag.year).or_default().push(tag.value);
            by_month.entry(tag.month).or_default().push(tag.value);
        }

        let year_labels: Vec<String> = by_year.keys().map(|y| y.to_string()).collect();
        let year_values: Vec<Vec<f64>> = by_year.into_values().collect();

        // Calendar order, not first-seen order; absent months stay as empty groups
        let month_labels: Vec<String> = MONTH_ABBREVIATIONS.iter().map(|m| m.to_string()).collect();
        let month_values: Vec<Vec<f64>> = MONTH_ABBREVIATIONS
            .iter()
            .map(|m| by_month.remove(m).unwrap_or_default())
            .collect();

        BoxChartData {
            by_year: Self::box_groups(year_labels, year_values),
            by_month: Self::box_groups(month_labels, month_values),
        }
    }

    fn box_groups(labels: Vec<String>, values: Vec<Vec<f64>>) -> Vec<BoxGroup> {
        let summaries = StatsCalculator::box_summaries_parallel(&values);
        labels
            .into_iter()
            .zip(values)
            .zip(summaries)
            .map(|((label, values), summary)| BoxGroup {
                label,
                values,
                summary,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Observation;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn line_data_keeps_dates_without_gap_filling() {
        let series = TimeSeries::from_observations(&[
            Observation::new(date(2016, 5, 9), 1201),
            Observation::new(date(2016, 5, 10), 2329),
            Observation::new(date(2016, 5, 11), 1716),
            Observation::new(date(2016, 6, 1), 1500),
        ])
        .unwrap();

        let data = ChartPlotter::line_data(&series);
        assert_eq!(
            data.points,
            vec![
                (date(2016, 5, 9), 1201.0),
                (date(2016, 5, 10), 2329.0),
                (date(2016, 5, 11), 1716.0),
                (date(2016, 6, 1), 1500.0),
            ]
        );
    }

    #[test]
    fn month_groups_follow_calendar_order_regardless_of_input() {
        let series = TimeSeries::from_observations(&[
            Observation::new(date(2019, 12, 1), 40),
            Observation::new(date(2017, 3, 1), 10),
            Observation::new(date(2018, 7, 4), 20),
            Observation::new(date(2016, 1, 9), 30),
        ])
        .unwrap();

        let data = ChartPlotter::box_data(&series);
        let months: Vec<&str> = data.by_month.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(months, MONTH_ABBREVIATIONS.to_vec());

        let years: Vec<&str> = data.by_year.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(years, vec!["2016", "2017", "2018", "2019"]);

        assert_eq!(data.by_month[0].values, vec![30.0]);
        assert!(data.by_month[1].summary.is_none());
        assert_eq!(data.by_month[11].values, vec![40.0]);
    }

    #[test]
    fn month_groups_pool_values_across_years() {
        let series = TimeSeries::from_observations(&[
            Observation::new(date(2017, 3, 1), 10),
            Observation::new(date(2018, 3, 15), 20),
            Observation::new(date(2019, 3, 31), 30),
            Observation::new(date(2019, 4, 1), 99),
        ])
        .unwrap();

        let data = ChartPlotter::box_data(&series);
        assert_eq!(data.by_month[2].label, "Mar");
        assert_eq!(data.by_month[2].values, vec![10.0, 20.0, 30.0]);
        assert_eq!(data.by_month[2].summary.as_ref().map(|s| s.median), Some(20.0));
        assert_eq!(data.by_month[3].values, vec![99.0]);
    }

    #[test]
    fn bar_data_reports_mean_per_year_month() {
        let series = TimeSeries::from_observations(&[
            Observation::new(date(2017, 2, 1), 10),
            Observation::new(date(2017, 2, 2), 30),
            Observation::new(date(2018, 2, 1), 7),
        ])
        .unwrap();

        let data = ChartPlotter::bar_data(&series).unwrap();
        assert_eq!(data.table.years, vec![2017, 2018]);
        assert_eq!(data.table.get(2017, 2), Some(20.0));
        assert_eq!(data.table.get(2018, 2), Some(7.0));
        assert_eq!(data.table.get(2018, 3), None);
    }
}

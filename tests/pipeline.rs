use chrono::{Datelike, Days, NaiveDate};
use pageview_visualizer::charts::{
    ChartData, BAR_TITLE, LINE_TITLE, MONTH_BOX_TITLE, YEAR_BOX_TITLE,
};
use pageview_visualizer::data::{DataLoader, MONTH_ABBREVIATIONS, MONTH_NAMES};
use pageview_visualizer::{TimeSeriesVisualizer, VisualizerConfig, VisualizerError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const DAYS: u64 = 1330;

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 5, 9).unwrap()
}

/// Daily rows from 2016-05-09 to 2019-12-29 with a few extreme days.
fn sample_rows() -> Vec<(NaiveDate, u64)> {
    (0..DAYS)
        .map(|i| {
            let value = match i {
                0 => 1201,
                1 => 2329,
                2 => 1716,
                101 => 10,
                i if i % 200 == 0 => 50_000,
                i => 800 + (i * 7919) % 9000,
            };
            (start_date() + Days::new(i), value)
        })
        .collect()
}

fn write_csv(dir: &Path, rows: &[(NaiveDate, u64)]) -> PathBuf {
    let mut body = String::from("date,value\n");
    for (date, value) in rows {
        body.push_str(&format!("{},{}\n", date.format("%Y-%m-%d"), value));
    }
    let path = dir.join("fcc-forum-pageviews.csv");
    fs::write(&path, body).unwrap();
    path
}

fn config_for(dir: &Path, input: PathBuf) -> VisualizerConfig {
    VisualizerConfig {
        input_path: input,
        output_dir: dir.join("charts"),
        ..Default::default()
    }
}

fn numpy_quantile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let (lo, hi) = (rank.floor() as usize, rank.ceil() as usize);
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

#[test]
fn writes_three_charts_with_configured_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), &sample_rows());
    let config = config_for(dir.path(), input);

    let visualizer = TimeSeriesVisualizer::from_config(config.clone()).unwrap();
    let [line, bar, boxes] = visualizer.draw_all().unwrap();
    assert_eq!(visualizer.config(), &config);

    assert_eq!(image::image_dimensions(config.line_plot_path()).unwrap(), (1500, 500));
    assert_eq!(image::image_dimensions(config.bar_plot_path()).unwrap(), (1000, 700));
    assert_eq!(image::image_dimensions(config.box_plot_path()).unwrap(), (1500, 600));

    assert_eq!(line.panels()[0].title, LINE_TITLE);
    assert_eq!(line.panels()[0].x_label, "Date");
    assert_eq!(line.panels()[0].y_label, "Page Views");

    assert_eq!(bar.panels()[0].title, BAR_TITLE);
    assert_eq!(bar.panels()[0].categories, vec!["2016", "2017", "2018", "2019"]);
    assert_eq!(bar.legend(), MONTH_NAMES.map(String::from).as_slice());

    let titles: Vec<&str> = boxes.panels().iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec![YEAR_BOX_TITLE, MONTH_BOX_TITLE]);
}

#[test]
fn line_plot_keeps_example_points_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), &sample_rows());
    let visualizer = TimeSeriesVisualizer::from_config(config_for(dir.path(), input)).unwrap();

    let figure = visualizer.draw_line_plot().unwrap();
    let ChartData::Line(data) = figure.data() else {
        panic!("line figure carries line data");
    };

    let start = start_date();
    assert_eq!(
        &data.points[..3],
        &[
            (start, 1201.0),
            (start + Days::new(1), 2329.0),
            (start + Days::new(2), 1716.0),
        ]
    );
    assert!(data.points.windows(2).all(|w| w[0].0 < w[1].0));
    assert_eq!(data.points.len(), visualizer.series().len());
}

#[test]
fn retained_values_lie_within_original_percentiles() {
    let dir = tempfile::tempdir().unwrap();
    let rows = sample_rows();
    let input = write_csv(dir.path(), &rows);
    let visualizer = TimeSeriesVisualizer::from_config(config_for(dir.path(), input)).unwrap();

    let mut original: Vec<f64> = rows.iter().map(|(_, v)| *v as f64).collect();
    original.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let lower = numpy_quantile(&original, 0.025);
    let upper = numpy_quantile(&original, 0.975);

    let bounds = visualizer.bounds();
    assert!((bounds.lower - lower).abs() < 1e-6);
    assert!((bounds.upper - upper).abs() < 1e-6);

    let cleaned = visualizer.series().observations();
    assert!(cleaned
        .iter()
        .all(|o| (o.value as f64) >= lower && (o.value as f64) <= upper));
    let expected = original.iter().filter(|&&v| v >= lower && v <= upper).count();
    assert_eq!(cleaned.len(), expected);
    assert!(cleaned.iter().all(|o| o.value != 50_000 && o.value != 10));
}

#[test]
fn bar_heights_are_monthly_means_of_cleaned_values() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), &sample_rows());
    let visualizer = TimeSeriesVisualizer::from_config(config_for(dir.path(), input)).unwrap();

    let mut sums: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for o in visualizer.series().observations() {
        let entry = sums.entry((o.date.year(), o.date.month())).or_default();
        entry.0 += o.value as f64;
        entry.1 += 1;
    }

    let figure = visualizer.draw_bar_plot().unwrap();
    let ChartData::Bar(data) = figure.data() else {
        panic!("bar figure carries bar data");
    };

    for ((year, month), (sum, count)) in &sums {
        let height = data.table.get(*year, *month).unwrap();
        assert!((height - sum / *count as f64).abs() < 1e-9);
    }
    // 2016 starts in May
    assert_eq!(data.table.get(2016, 4), None);
}

#[test]
fn month_categories_ignore_input_row_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = sample_rows();
    rows.reverse();
    rows.swap(10, 700);
    let input = write_csv(dir.path(), &rows);
    let visualizer = TimeSeriesVisualizer::from_config(config_for(dir.path(), input)).unwrap();

    let figure = visualizer.draw_box_plot().unwrap();
    assert_eq!(figure.panels()[1].categories, MONTH_ABBREVIATIONS.to_vec());
    assert_eq!(
        figure.panels()[0].categories,
        vec!["2016", "2017", "2018", "2019"]
    );

    let ChartData::Box(data) = figure.data() else {
        panic!("box figure carries box data");
    };
    let total: usize = data.by_month.iter().map(|g| g.values.len()).sum();
    assert_eq!(total, visualizer.series().len());
}

#[test]
fn rerunning_on_same_input_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), &sample_rows());
    let config = config_for(dir.path(), input);

    let first = TimeSeriesVisualizer::from_config(config.clone()).unwrap();
    let second = TimeSeriesVisualizer::from_config(config).unwrap();

    assert_eq!(first.series(), second.series());
    assert_eq!(first.bounds(), second.bounds());

    let bar_a = first.draw_bar_plot().unwrap();
    let bar_b = second.draw_bar_plot().unwrap();
    assert_eq!(
        serde_json::to_string(bar_a.data()).unwrap(),
        serde_json::to_string(bar_b.data()).unwrap()
    );

    let box_a = first.draw_box_plot().unwrap();
    let box_b = second.draw_box_plot().unwrap();
    assert_eq!(box_a.data(), box_b.data());
}

#[test]
fn figure_encodes_png_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), &sample_rows());
    let visualizer = TimeSeriesVisualizer::from_config(config_for(dir.path(), input)).unwrap();

    let figure = visualizer.draw_line_plot().unwrap();
    let bytes = figure.to_png_bytes().unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1500, 500));
    assert_eq!(figure.to_image().unwrap().dimensions(), (1500, 500));
    // Something other than the white background was drawn
    assert!(figure.pixels().iter().any(|&p| p != 255));
}

#[test]
fn missing_input_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), dir.path().join("absent.csv"));

    let result = TimeSeriesVisualizer::from_config(config);
    assert!(matches!(result, Err(VisualizerError::Loader(_))));
}

#[test]
fn loader_and_pipeline_agree_on_raw_series() {
    let dir = tempfile::tempdir().unwrap();
    let rows = sample_rows();
    let input = write_csv(dir.path(), &rows);

    let raw = DataLoader::new().load_csv(&input).unwrap();
    assert_eq!(raw.len(), rows.len());

    let visualizer =
        TimeSeriesVisualizer::from_series(config_for(dir.path(), input), &raw).unwrap();
    assert!(visualizer.series().len() < raw.len());
}

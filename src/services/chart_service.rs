use chrono::{DateTime, Duration, Utc};
use plotters::prelude::*;
use plotters::style::FontTransform;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;
use tracing::info;

use crate::db::pricelog::{HistoryLog, LogReadError};
use crate::models::{ChartImage, HistorySummary, PricePoint, PriceSample};
use crate::viewer::{self, ViewerError};

pub const CHART_TITLE: &str = "Amazon Product Price Trend";
const CHART_WIDTH: u32 = 1000;
const CHART_HEIGHT: u32 = 500;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to read price history: {0}")]
    Read(#[from] LogReadError),
    #[error("Failed to render chart: {0}")]
    Render(String),
    #[error(transparent)]
    Viewer(#[from] ViewerError),
}

/// Project recorded samples onto chart coordinates, in log order
pub fn build_series(samples: &[PriceSample]) -> Vec<PricePoint> {
    samples
        .iter()
        .filter_map(|s| {
            Some(PricePoint {
                timestamp: DateTime::<Utc>::from_naive_utc_and_offset(s.timestamp, Utc),
                price: s.price.to_f64()?,
            })
        })
        .collect()
}

/// Count, time span and price extremes of the history
pub fn summarize(samples: &[PriceSample]) -> Option<HistorySummary> {
    let first = samples.first()?;
    let latest = samples.last()?;

    Some(HistorySummary {
        count: samples.len(),
        first: first.timestamp,
        latest: latest.timestamp,
        latest_price: latest.price,
        min: samples.iter().map(|s| s.price).min()?,
        max: samples.iter().map(|s| s.price).max()?,
    })
}

/// Draw a line chart with point markers into an in-memory RGB buffer
pub fn render_chart(points: &[PricePoint]) -> Result<ChartImage, ChartError> {
    if points.is_empty() {
        return Err(ChartError::Render("no price points to draw".to_string()));
    }

    let (x_min, x_max) = time_bounds(points);
    let (y_min, y_max) = price_bounds(points);
    let mut pixels = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut pixels, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ChartError::Render(format!("Failed to fill canvas: {}", e)))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(CHART_TITLE, ("sans-serif", 30.0).into_font())
            .margin(15)
            .x_label_area_size(110)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| ChartError::Render(format!("Failed to build chart: {}", e)))?;

        // Mesh lines double as the grid
        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Price (GBP)")
            .x_labels(10)
            .x_label_formatter(&|dt: &DateTime<Utc>| dt.format("%Y-%m-%d %H:%M").to_string())
            .x_label_style(("sans-serif", 12.0).into_font().transform(FontTransform::Rotate90))
            .draw()
            .map_err(|e| ChartError::Render(format!("Failed to draw mesh: {}", e)))?;

        chart
            .draw_series(LineSeries::new(
                points.iter().map(|p| (p.timestamp, p.price)),
                &BLUE,
            ))
            .map_err(|e| ChartError::Render(format!("Failed to draw line: {}", e)))?;

        chart
            .draw_series(
                points
                    .iter()
                    .map(|p| Circle::new((p.timestamp, p.price), 4, BLUE.filled())),
            )
            .map_err(|e| ChartError::Render(format!("Failed to draw points: {}", e)))?;

        root.present()
            .map_err(|e| ChartError::Render(format!("Failed to render chart: {}", e)))?;
    }

    Ok(ChartImage {
        width: CHART_WIDTH,
        height: CHART_HEIGHT,
        pixels,
    })
}

/// Read the whole history, log a summary and show the chart until dismissed
pub fn plot_history(log: &HistoryLog, show_window: bool) -> Result<(), ChartError> {
    let samples = log.read_all()?;

    let Some(summary) = summarize(&samples) else {
        info!("No data available.");
        return Ok(());
    };

    info!(
        "📈 {} price samples from {} to {} (low £{}, high £{}, latest £{})",
        summary.count, summary.first, summary.latest, summary.min, summary.max, summary.latest_price
    );

    if !show_window {
        info!("Chart window disabled, skipping display");
        return Ok(());
    }

    let image = render_chart(&build_series(&samples))?;
    viewer::show_chart(image, CHART_TITLE)?;
    Ok(())
}

fn time_bounds(points: &[PricePoint]) -> (DateTime<Utc>, DateTime<Utc>) {
    let min = points.iter().map(|p| p.timestamp).min().unwrap_or_else(Utc::now);
    let max = points.iter().map(|p| p.timestamp).max().unwrap_or(min);

    if min == max {
        (min - Duration::hours(1), max + Duration::hours(1))
    } else {
        (min, max)
    }
}

fn price_bounds(points: &[PricePoint]) -> (f64, f64) {
    let min = points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);

    let range = max - min;
    let padding = if range > 1e-8 { range * 0.1 } else { (max.abs() * 0.05).max(1.0) };
    ((min - padding).max(0.0), max + padding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn history() -> Vec<PriceSample> {
        let day = |d: u32| NaiveDate::from_ymd_opt(2025, 3, d).unwrap().and_hms_opt(9, 0, 0).unwrap();
        vec![
            PriceSample::new(day(1), Decimal::from_str("650.00").unwrap()),
            PriceSample::new(day(2), Decimal::from_str("590.00").unwrap()),
            PriceSample::new(day(3), Decimal::from_str("612.49").unwrap()),
        ]
    }

    #[test]
    fn test_series_follows_log_order() {
        let series = build_series(&history());
        let prices: Vec<f64> = series.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![650.0, 590.0, 612.49]);
        assert!(series.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_plotting_twice_gives_identical_series() {
        let log = HistoryLog::new(
            std::env::temp_dir().join(format!("price_tracker_{}.csv", uuid::Uuid::new_v4())),
        );
        for sample in history() {
            log.append(&sample).unwrap();
        }

        let first = build_series(&log.read_all().unwrap());
        let second = build_series(&log.read_all().unwrap());
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);

        std::fs::remove_file(log.path()).ok();
    }

    #[test]
    fn test_summary() {
        let summary = summarize(&history()).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min, Decimal::from_str("590.00").unwrap());
        assert_eq!(summary.max, Decimal::from_str("650.00").unwrap());
        assert_eq!(summary.latest_price, Decimal::from_str("612.49").unwrap());
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_empty_history_is_not_an_error() {
        let log = HistoryLog::new(
            std::env::temp_dir().join(format!("price_tracker_{}.csv", uuid::Uuid::new_v4())),
        );
        assert!(plot_history(&log, true).is_ok());
    }

    #[test]
    fn test_malformed_log_is_read_error() {
        let path = std::env::temp_dir().join(format!("price_tracker_{}.csv", uuid::Uuid::new_v4()));
        std::fs::write(&path, "Date,Price\n2025-03-01 09:00:00,650.00\nyesterday,abc\n").unwrap();
        let log = HistoryLog::new(&path);

        assert!(matches!(plot_history(&log, true), Err(ChartError::Read(_))));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_single_point_bounds_are_padded() {
        let series = build_series(&history()[..1]);
        let (x_min, x_max) = time_bounds(&series);
        let (y_min, y_max) = price_bounds(&series);
        assert!(x_min < x_max);
        assert!(y_min < 650.0 && 650.0 < y_max);
    }
}

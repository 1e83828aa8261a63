//! Chart generation models

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;

/// A single data point on a price chart
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// A rendered chart as a packed RGB8 buffer
#[derive(Debug, Clone)]
pub struct ChartImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Aggregate view of the history, logged alongside the chart
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub count: usize,
    pub first: NaiveDateTime,
    pub latest: NaiveDateTime,
    pub latest_price: Decimal,
    pub min: Decimal,
    pub max: Decimal,
}

//! Price sample model

use chrono::{Local, NaiveDateTime};
use rust_decimal::Decimal;

/// One observation of the tracked item's price
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSample {
    pub timestamp: NaiveDateTime,
    pub price: Decimal,
}

impl PriceSample {
    pub fn new(timestamp: NaiveDateTime, price: Decimal) -> Self {
        Self { timestamp, price }
    }

    /// Sample stamped with the current local wall-clock time
    pub fn now(price: Decimal) -> Self {
        Self::new(Local::now().naive_local(), price)
    }
}

//! Data models shared by the tracker's services
//!
//! Each model represents the output of one stage: a recorded sample, a chart
//! projection, or the outcome of a check cycle.

pub mod sample;
pub mod chart;
pub mod cycle;

pub use sample::PriceSample;
pub use chart::{ChartImage, HistorySummary, PricePoint};
pub use cycle::{AlertStatus, CycleOutcome, TrackerState};

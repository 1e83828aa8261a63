//! Flat-file storage for the price history.

pub mod pricelog;

pub use pricelog::HistoryLog;

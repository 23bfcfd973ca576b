//! Core domain types and logic: indicators, forecast, summary.

pub mod ohlcv;
pub mod indicator;
pub mod enrich;
pub mod forecast;
pub mod summary;
pub mod error;

//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
#[cfg(feature = "web")]
pub mod web;
#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;

use std::path::PathBuf;

use crate::domain::error::StockcastError;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

pub const DEFAULT_CSV_DIR: &str = "data";

/// Data source selected by `[data] source` (default `yahoo`).
pub fn build_data_port(
    config: &dyn ConfigPort,
) -> Result<Box<dyn DataPort + Send + Sync>, StockcastError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "yahoo".to_string())
        .to_lowercase();

    match source.as_str() {
        "csv" => {
            let dir = config
                .get_string("data", "csv_dir")
                .unwrap_or_else(|| DEFAULT_CSV_DIR.to_string());
            tracing::info!(dir = %dir, "using csv data source");
            Ok(Box::new(csv_adapter::CsvAdapter::new(PathBuf::from(dir))))
        }
        #[cfg(feature = "yahoo")]
        "yahoo" => {
            tracing::info!("using yahoo data source");
            Ok(Box::new(yahoo_adapter::YahooAdapter::from_config(config)?))
        }
        other => Err(StockcastError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unsupported data source '{}'", other),
        }),
    }
}

//! CSV file data adapter.
//!
//! One file per symbol at `<base_path>/<SYMBOL>.csv` with header
//! `date,open,high,low,close,volume`.

use crate::domain::error::StockcastError;
use crate::domain::ohlcv::{normalize_series, OhlcvBar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.to_uppercase()))
    }
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize, name: &str) -> Result<&'r str, StockcastError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| StockcastError::DataSource {
            reason: format!("missing {} column", name),
        })
}

fn price(record: &csv::StringRecord, idx: usize, name: &str) -> Result<f64, StockcastError> {
    field(record, idx, name)?
        .parse()
        .map_err(|e| StockcastError::DataSource {
            reason: format!("invalid {} value: {}", name, e),
        })
}

fn volume(record: &csv::StringRecord) -> Result<i64, StockcastError> {
    let raw = field(record, 5, "volume")?;
    raw.parse::<i64>()
        .or_else(|_| raw.parse::<f64>().map(|v| v.round() as i64))
        .map_err(|e| StockcastError::DataSource {
            reason: format!("invalid volume value: {}", e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_daily_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StockcastError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no csv file for symbol");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(StockcastError::DataSource {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| StockcastError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date = NaiveDate::parse_from_str(field(&record, 0, "date")?, "%Y-%m-%d").map_err(
                |e| StockcastError::DataSource {
                    reason: format!("invalid date format: {}", e),
                },
            )?;

            if date < start_date || date > end_date {
                continue;
            }

            bars.push(OhlcvBar {
                date,
                open: price(&record, 1, "open")?,
                high: price(&record, 2, "high")?,
                low: price(&record, 3, "low")?,
                close: price(&record, 4, "close")?,
                volume: volume(&record)?,
            });
        }

        Ok(normalize_series(bars))
    }
}

//! Yahoo Finance chart API data adapter.
//!
//! Requests daily bars from `<base_url>/<SYMBOL>?period1=..&period2=..&interval=1d`.
//! Rows with any missing price or volume are skipped. An unknown symbol (the
//! API answers with a `Not Found` chart error or no result) is an empty series.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::domain::error::StockcastError;
use crate::domain::ohlcv::{normalize_series, OhlcvBar};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_TIMEOUT_SECS: i64 = 10;
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

/// Parse a chart API body into ascending daily bars.
pub fn parse_chart(body: &str) -> Result<Vec<OhlcvBar>, StockcastError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| StockcastError::DataSource {
            reason: format!("invalid chart response: {}", e),
        })?;

    if let Some(error) = response.chart.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Ok(Vec::new());
        }
        return Err(StockcastError::DataSource {
            reason: format!("chart API error [{}]: {}", error.code, error.description),
        });
    }

    let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let Some(quote) = data.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };

    let mut bars = Vec::with_capacity(data.timestamp.len());

    for (i, &ts) in data.timestamp.iter().enumerate() {
        let fields = (
            at(&quote.open, i),
            at(&quote.high, i),
            at(&quote.low, i),
            at(&quote.close, i),
            at(&quote.volume, i),
        );
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = fields else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts + data.meta.gmtoffset, 0) else {
            continue;
        };

        bars.push(OhlcvBar {
            date: date.date_naive(),
            open,
            high,
            low,
            close,
            volume,
        });
    }

    Ok(normalize_series(bars))
}

fn at<T: Copy>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).copied().flatten()
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

pub struct YahooAdapter {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl YahooAdapter {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StockcastError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| StockcastError::DataSource {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockcastError> {
        let base_url = config
            .get_string("yahoo", "base_url")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = config.get_int("yahoo", "timeout_secs", DEFAULT_TIMEOUT_SECS);
        if timeout_secs <= 0 {
            return Err(StockcastError::ConfigInvalid {
                section: "yahoo".into(),
                key: "timeout_secs".into(),
                reason: "must be a positive number of seconds".into(),
            });
        }
        Self::new(base_url, Duration::from_secs(timeout_secs as u64))
    }

    /// `end_date` is inclusive, so the request runs to the following midnight.
    pub fn chart_url(&self, symbol: &str, start_date: NaiveDate, end_date: NaiveDate) -> String {
        let period1 = unix_midnight(start_date);
        let period2 = unix_midnight(end_date) + 86_400;
        format!(
            "{}/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url,
            symbol.to_uppercase(),
            period1,
            period2
        )
    }
}

impl DataPort for YahooAdapter {
    fn fetch_daily_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StockcastError> {
        if end_date < start_date {
            return Ok(Vec::new());
        }

        let url = self.chart_url(symbol, start_date, end_date);
        tracing::debug!(%url, "requesting chart");

        let body = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.text())
            .map_err(|e| StockcastError::DataSource {
                reason: format!("chart request failed: {}", e),
            })?;

        let bars = parse_chart(&body)?;
        Ok(bars
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect())
    }
}

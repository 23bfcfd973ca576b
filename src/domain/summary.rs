//! Summary assembly: indicators + forecast + chart window for one symbol.
//!
//! The serialized shape is fixed:
//!
//! ```json
//! { "ok": true, "symbol": "AAPL", "lastClose": 0.0,
//!   "forecast": { "heldOutMse": 0.0, "nextClose": 0.0, "lastClose": 0.0, "direction": "up" },
//!   "chart": { "dates": [], "close": [], "sma20": [], "upperBand": [], "lowerBand": [] } }
//! ```
//!
//! or `{ "ok": false, "error": "..." }`.

use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::domain::enrich::{compute_indicators, warmup_bars, IndicatorRow};
use crate::domain::error::{ErrorKind, StockcastError};
use crate::domain::forecast::{forecast, ForecastResult};
use crate::domain::ohlcv::{normalize_series, OhlcvBar};
use crate::ports::data_port::DataPort;

/// Most recent enriched rows included in the chart.
pub const CHART_WINDOW: usize = 180;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub dates: Vec<String>,
    pub close: Vec<f64>,
    pub sma20: Vec<Option<f64>>,
    pub upper_band: Vec<Option<f64>>,
    pub lower_band: Vec<Option<f64>>,
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

impl Chart {
    /// Chart of the last `CHART_WINDOW` rows, oldest first.
    pub fn from_rows(rows: &[IndicatorRow]) -> Self {
        let window = &rows[rows.len().saturating_sub(CHART_WINDOW)..];
        Self {
            dates: window
                .iter()
                .map(|r| r.date().format("%Y-%m-%d").to_string())
                .collect(),
            close: window.iter().map(IndicatorRow::close).collect(),
            sma20: window.iter().map(|r| finite(r.sma20)).collect(),
            upper_band: window.iter().map(|r| finite(r.upper_band)).collect(),
            lower_band: window.iter().map(|r| finite(r.lower_band)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub symbol: String,
    pub last_close: f64,
    pub forecast: ForecastResult,
    pub chart: Chart,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    Success(SummaryReport),
    /// `kind` is for the caller's status mapping and is not serialized.
    Failure { kind: ErrorKind, error: String },
}

impl Summary {
    pub fn failure(err: &StockcastError) -> Self {
        Summary::Failure {
            kind: err.kind(),
            error: err.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Summary::Success(_))
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Summary::Success(_) => None,
            Summary::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn report(&self) -> Option<&SummaryReport> {
        match self {
            Summary::Success(report) => Some(report),
            Summary::Failure { .. } => None,
        }
    }
}

impl Serialize for Summary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Summary::Success(report) => {
                let mut s = serializer.serialize_struct("Summary", 5)?;
                s.serialize_field("ok", &true)?;
                s.serialize_field("symbol", &report.symbol)?;
                s.serialize_field("lastClose", &report.last_close)?;
                s.serialize_field("forecast", &report.forecast)?;
                s.serialize_field("chart", &report.chart)?;
                s.end()
            }
            Summary::Failure { error, .. } => {
                let mut s = serializer.serialize_struct("Summary", 2)?;
                s.serialize_field("ok", &false)?;
                s.serialize_field("error", error)?;
                s.end()
            }
        }
    }
}

fn build_report(symbol: &str, bars: &[OhlcvBar]) -> Result<SummaryReport, StockcastError> {
    if bars.is_empty() {
        return Err(StockcastError::NoData {
            symbol: symbol.to_string(),
        });
    }

    let rows = compute_indicators(bars);
    if rows.is_empty() {
        return Err(StockcastError::InsufficientData {
            stage: "indicator windows",
            have: bars.len(),
            need: warmup_bars() + 1,
        });
    }

    // The forecast sees every enriched row; the chart is only a display slice.
    let forecast = forecast(&rows)?;

    Ok(SummaryReport {
        symbol: symbol.to_string(),
        last_close: forecast.last_close,
        forecast,
        chart: Chart::from_rows(&rows),
    })
}

/// Assemble the summary for `symbol` from an ascending daily series.
pub fn assemble(symbol: &str, bars: &[OhlcvBar]) -> Summary {
    let symbol = symbol.trim().to_uppercase();
    match build_report(&symbol, bars) {
        Ok(report) => Summary::Success(report),
        Err(e) => {
            tracing::warn!(symbol = %symbol, bars = bars.len(), error = %e, "summary failed");
            Summary::failure(&e)
        }
    }
}

/// Fetch `[start, end]` for `symbol` and assemble its summary.
///
/// A failed fetch is treated like an empty series.
pub fn get_summary_between(
    data_port: &dyn DataPort,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Summary {
    let symbol = symbol.trim().to_uppercase();
    tracing::info!(symbol = %symbol, %start, %end, "fetching daily series");

    let bars = match data_port.fetch_daily_series(&symbol, start, end) {
        Ok(bars) => normalize_series(bars),
        Err(e) => {
            tracing::warn!(symbol = %symbol, error = %e, "data source fetch failed");
            Vec::new()
        }
    };
    tracing::info!(symbol = %symbol, bars = bars.len(), "fetched daily series");

    assemble(&symbol, &bars)
}

/// [`get_summary_between`] from `start` through today.
pub fn get_summary(data_port: &dyn DataPort, symbol: &str, start: NaiveDate) -> Summary {
    let today = chrono::Local::now().date_naive();
    get_summary_between(data_port, symbol, start, today)
}

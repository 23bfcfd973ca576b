//! Indicator engine: enriches a price series with the fixed indicator set.
//!
//! Each indicator is computed independently over the full series, then rows
//! are zipped back together. A row is kept only when every indicator is
//! defined for it (and every value is finite), so the output is one fully
//! populated series with a single leading cutoff.

use chrono::NaiveDate;

use crate::domain::indicator::bollinger::{self, calculate_bollinger};
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::stddev::calculate_stddev;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub const SMA_PERIODS: [usize; 4] = [10, 20, 30, 50];
pub const EMA_PERIODS: [usize; 3] = [10, 30, 50];
pub const RSI_PERIOD: usize = 7;
pub const BAND_PERIOD: usize = bollinger::DEFAULT_PERIOD;
pub const BAND_MULT_X100: u32 = bollinger::DEFAULT_STDDEV_MULT_X100;

/// One bar plus every derived indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub bar: OhlcvBar,
    pub sma10: f64,
    pub sma20: f64,
    pub sma30: f64,
    pub sma50: f64,
    pub ema10: f64,
    pub ema30: f64,
    pub ema50: f64,
    pub rsi: f64,
    pub std20: f64,
    pub upper_band: f64,
    pub lower_band: f64,
}

impl IndicatorRow {
    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }

    fn is_finite(&self) -> bool {
        [
            self.bar.close,
            self.sma10,
            self.sma20,
            self.sma30,
            self.sma50,
            self.ema10,
            self.ema30,
            self.ema50,
            self.rsi,
            self.std20,
            self.upper_band,
            self.lower_band,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// The indicators attached to every row.
pub fn indicator_set() -> Vec<IndicatorType> {
    let mut set: Vec<IndicatorType> = SMA_PERIODS.iter().map(|&p| IndicatorType::Sma(p)).collect();
    set.extend(EMA_PERIODS.iter().map(|&p| IndicatorType::Ema(p)));
    set.push(IndicatorType::Rsi(RSI_PERIOD));
    set.push(IndicatorType::Stddev(BAND_PERIOD));
    set.push(IndicatorType::Bollinger {
        period: BAND_PERIOD,
        stddev_mult_x100: BAND_MULT_X100,
    });
    set
}

/// Leading bars dropped by the cutoff (longest lookback in the set).
pub fn warmup_bars() -> usize {
    indicator_set()
        .iter()
        .map(IndicatorType::lookback)
        .max()
        .unwrap_or(0)
}

struct ComputedSeries {
    sma10: IndicatorSeries,
    sma20: IndicatorSeries,
    sma30: IndicatorSeries,
    sma50: IndicatorSeries,
    ema10: IndicatorSeries,
    ema30: IndicatorSeries,
    ema50: IndicatorSeries,
    rsi: IndicatorSeries,
    std20: IndicatorSeries,
    bands: IndicatorSeries,
}

impl ComputedSeries {
    fn new(bars: &[OhlcvBar]) -> Self {
        Self {
            sma10: calculate_sma(bars, SMA_PERIODS[0]),
            sma20: calculate_sma(bars, SMA_PERIODS[1]),
            sma30: calculate_sma(bars, SMA_PERIODS[2]),
            sma50: calculate_sma(bars, SMA_PERIODS[3]),
            ema10: calculate_ema(bars, EMA_PERIODS[0]),
            ema30: calculate_ema(bars, EMA_PERIODS[1]),
            ema50: calculate_ema(bars, EMA_PERIODS[2]),
            rsi: calculate_rsi(bars, RSI_PERIOD),
            std20: calculate_stddev(bars, BAND_PERIOD),
            bands: calculate_bollinger(bars, BAND_PERIOD, BAND_MULT_X100),
        }
    }

    fn series(&self) -> [&IndicatorSeries; 10] {
        [
            &self.sma10,
            &self.sma20,
            &self.sma30,
            &self.sma50,
            &self.ema10,
            &self.ema30,
            &self.ema50,
            &self.rsi,
            &self.std20,
            &self.bands,
        ]
    }

    fn row_at(&self, bar: &OhlcvBar, i: usize) -> Option<IndicatorRow> {
        let (upper_band, _, lower_band) = self.bands.bands_at(i)?;
        Some(IndicatorRow {
            bar: bar.clone(),
            sma10: self.sma10.simple_at(i)?,
            sma20: self.sma20.simple_at(i)?,
            sma30: self.sma30.simple_at(i)?,
            sma50: self.sma50.simple_at(i)?,
            ema10: self.ema10.simple_at(i)?,
            ema30: self.ema30.simple_at(i)?,
            ema50: self.ema50.simple_at(i)?,
            rsi: self.rsi.simple_at(i)?,
            std20: self.std20.simple_at(i)?,
            upper_band,
            lower_band,
        })
    }
}

/// Enrich `bars` (ascending by date) with the full indicator set.
///
/// Returns an empty vector when the series is shorter than the longest window.
pub fn compute_indicators(bars: &[OhlcvBar]) -> Vec<IndicatorRow> {
    let computed = ComputedSeries::new(bars);

    let rows: Vec<IndicatorRow> = bars
        .iter()
        .enumerate()
        .filter_map(|(i, bar)| computed.row_at(bar, i))
        .filter(IndicatorRow::is_finite)
        .collect();

    tracing::debug!(
        input_bars = bars.len(),
        enriched_rows = rows.len(),
        "computed indicators"
    );
    if rows.is_empty() && !bars.is_empty() {
        if let Some(longest) = computed
            .series()
            .into_iter()
            .max_by_key(|s| s.indicator_type.lookback())
        {
            tracing::debug!(
                input_bars = bars.len(),
                limiting = %longest.indicator_type,
                "series shorter than the longest indicator window"
            );
        }
    }
    rows
}

//! Next-day close forecast: a single-feature ordinary least squares baseline.
//!
//! Each consecutive pair of rows becomes one sample `(close_t, close_{t+1})`.
//! Samples are split chronologically (first 80% train, last 20% test, never
//! shuffled), the line is fitted on the training samples only, scored on the
//! test samples by mean squared error, and finally applied to the most recent
//! close.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::enrich::IndicatorRow;
use crate::domain::error::StockcastError;

/// Share of samples held out for testing, in percent.
pub const TEST_PERCENT: usize = 20;

/// Fewest samples that still leave one training and one test sample.
pub const MIN_PAIRS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Ties count as up.
    pub fn from_prediction(next_close: f64, last_close: f64) -> Self {
        if next_close >= last_close {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub held_out_mse: f64,
    pub next_close: f64,
    pub last_close: f64,
    pub direction: Direction,
}

/// One supervised sample: the close on `date` and the close of the next row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingPair {
    pub date: NaiveDate,
    pub close: f64,
    pub next_close: f64,
}

pub fn build_pairs(rows: &[IndicatorRow]) -> Vec<TrainingPair> {
    rows.windows(2)
        .map(|w| TrainingPair {
            date: w[0].date(),
            close: w[0].close(),
            next_close: w[1].close(),
        })
        .collect()
}

/// Split into `(train, test)` preserving order; the test part is the last
/// `ceil(len * TEST_PERCENT / 100)` samples.
pub fn chronological_split(pairs: &[TrainingPair]) -> (&[TrainingPair], &[TrainingPair]) {
    let n_test = (pairs.len() * TEST_PERCENT).div_ceil(100);
    pairs.split_at(pairs.len() - n_test)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Closed-form least squares on `next_close ≈ slope * close + intercept`.
    ///
    /// With no variance in `close` the slope is 0 and the intercept is the
    /// mean target. An empty sample set yields `None`.
    pub fn fit(pairs: &[TrainingPair]) -> Option<Self> {
        if pairs.is_empty() {
            return None;
        }
        let n = pairs.len() as f64;
        let mean_x = pairs.iter().map(|p| p.close).sum::<f64>() / n;
        let mean_y = pairs.iter().map(|p| p.next_close).sum::<f64>() / n;

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for p in pairs {
            let dx = p.close - mean_x;
            sxy += dx * (p.next_close - mean_y);
            sxx += dx * dx;
        }

        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn predict(&self, close: f64) -> f64 {
        self.slope * close + self.intercept
    }

    pub fn mean_squared_error(&self, pairs: &[TrainingPair]) -> f64 {
        if pairs.is_empty() {
            return 0.0;
        }
        pairs
            .iter()
            .map(|p| {
                let err = p.next_close - self.predict(p.close);
                err * err
            })
            .sum::<f64>()
            / pairs.len() as f64
    }
}

pub fn forecast(rows: &[IndicatorRow]) -> Result<ForecastResult, StockcastError> {
    let pairs = build_pairs(rows);
    if pairs.len() < MIN_PAIRS {
        return Err(StockcastError::InsufficientData {
            stage: "forecast training pairs",
            have: pairs.len(),
            need: MIN_PAIRS,
        });
    }

    let (train, test) = chronological_split(&pairs);
    let fit = LinearFit::fit(train).ok_or_else(|| StockcastError::Internal {
        reason: "empty training split".into(),
    })?;

    let held_out_mse = fit.mean_squared_error(test);
    let last_close = rows
        .last()
        .map(IndicatorRow::close)
        .ok_or_else(|| StockcastError::Internal {
            reason: "no rows to forecast from".into(),
        })?;
    let next_close = fit.predict(last_close);

    if !(held_out_mse.is_finite() && next_close.is_finite()) {
        return Err(StockcastError::Internal {
            reason: format!(
                "non-finite forecast (slope {}, intercept {}, mse {})",
                fit.slope, fit.intercept, held_out_mse
            ),
        });
    }

    tracing::debug!(
        train = train.len(),
        test = test.len(),
        slope = fit.slope,
        intercept = fit.intercept,
        held_out_mse,
        "fitted next-close model"
    );

    Ok(ForecastResult {
        held_out_mse,
        next_close,
        last_close,
        direction: Direction::from_prediction(next_close, last_close),
    })
}

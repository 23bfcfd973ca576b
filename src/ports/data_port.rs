//! Market data access port trait.

use crate::domain::error::StockcastError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `symbol` with `start <= date <= end`.
    ///
    /// Unknown symbols and empty ranges return an empty vector.
    fn fetch_daily_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StockcastError>;
}

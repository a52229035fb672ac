//! Market data port trait.

use crate::domain::error::AccumulatorError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// Daily bars for `symbol`, oldest first, covering the last
    /// `lookback_days` calendar days of available history.
    fn fetch_bars(&self, symbol: &str, lookback_days: u32)
    -> Result<Vec<OhlcvBar>, AccumulatorError>;
}

//! Shared helpers turning a close/volume series into the values the scorer
//! reads: the latest RSI/EMA pair and the auxiliary price/volume metrics.

use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::rsi::calculate_rsi;

/// Latest indicator values at the end of a close series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub ema_long: Option<f64>,
}

impl IndicatorSnapshot {
    /// Both values, or `None` if either is still undefined.
    pub fn both(&self) -> Option<(f64, f64)> {
        Some((self.rsi?, self.ema_long?))
    }
}

pub fn latest_indicators(closes: &[f64], rsi_period: usize, ema_period: usize) -> IndicatorSnapshot {
    IndicatorSnapshot {
        rsi: calculate_rsi(closes, rsi_period).latest(),
        ema_long: calculate_ema(closes, ema_period).latest(),
    }
}

/// Latest volume compared to the mean of the trailing `window` volumes
/// (the latest one included), as a percentage.
///
/// `None` with fewer than `window` observations or a non-positive mean.
pub fn volume_deviation_pct(volumes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || volumes.len() < window {
        return None;
    }
    let recent = &volumes[volumes.len() - window..];
    let mean = recent.iter().sum::<f64>() / window as f64;
    let last = *recent.last()?;
    if mean > 0.0 {
        Some((last - mean) / mean * 100.0)
    } else {
        None
    }
}

/// Highest close in the series.
pub fn series_high(closes: &[f64]) -> Option<f64> {
    closes.iter().copied().reduce(f64::max)
}

/// Lowest close over the trailing `lookback` closes (or all of them when the
/// series is shorter).
pub fn trailing_low(closes: &[f64], lookback: usize) -> Option<f64> {
    let take = lookback.min(closes.len());
    closes[closes.len() - take..].iter().copied().reduce(f64::min)
}

//! Daily bars and the per-symbol market series handed to the scorer.

use chrono::{Duration, NaiveDate};

#[derive(Debug, Clone)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Missing when the provider reported no volume for the day.
    pub volume: Option<f64>,
}

/// Keep only the bars dated within `days` calendar days of the latest bar.
///
/// Bars are expected in chronological order.
pub fn trailing_window(bars: &[OhlcvBar], days: u32) -> &[OhlcvBar] {
    let Some(last) = bars.last() else {
        return bars;
    };
    let cutoff = last.date - Duration::days(i64::from(days));
    let start = bars.partition_point(|b| b.date < cutoff);
    &bars[start..]
}

/// Closing prices, volumes and the live price for one symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketSeries {
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
    pub latest_price: f64,
}

impl MarketSeries {
    /// Build a series from chronological bars.
    ///
    /// Bars without a positive close are dropped. Volumes are collected from
    /// the remaining bars that report one. The latest price is the last close,
    /// or 0 when nothing survives.
    pub fn from_bars(bars: &[OhlcvBar]) -> Self {
        let usable = bars.iter().filter(|b| b.close.is_finite() && b.close > 0.0);
        let mut closes = Vec::with_capacity(bars.len());
        let mut volumes = Vec::with_capacity(bars.len());
        for bar in usable {
            closes.push(bar.close);
            if let Some(v) = bar.volume.filter(|v| v.is_finite()) {
                volumes.push(v);
            }
        }
        let latest_price = closes.last().copied().unwrap_or(0.0);
        Self {
            closes,
            volumes,
            latest_price,
        }
    }

    /// Replace the live price, e.g. with a quote newer than the last close.
    pub fn with_quote(mut self, price: f64) -> Self {
        if price.is_finite() && price > 0.0 {
            self.latest_price = price;
        }
        self
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

//! Technical indicators over closing prices.
//!
//! - `IndicatorPoint`: one point in an indicator series, aligned to a close
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: the full series, with `latest()` for the scorer

pub mod ema;
pub mod rsi;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub(crate) fn warmup() -> Self {
        Self {
            valid: false,
            value: 0.0,
        }
    }

    pub(crate) fn ready(value: f64) -> Self {
        Self { valid: true, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// The value at the last close, if it is past warmup and finite.
    pub fn latest(&self) -> Option<f64> {
        self.values
            .last()
            .filter(|p| p.valid && p.value.is_finite())
            .map(|p| p.value)
    }
}

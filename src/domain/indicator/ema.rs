//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) closes are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};

pub fn calculate_ema(closes: &[f64], period: usize) -> IndicatorSeries {
    if period == 0 || closes.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(period),
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(closes.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &close) in closes.iter().enumerate() {
        if i < period - 1 {
            sum += close;
            values.push(IndicatorPoint::warmup());
        } else if i == period - 1 {
            sum += close;
            ema = sum / period as f64;
            values.push(IndicatorPoint::ready(ema));
        } else {
            ema = close * k + ema * (1.0 - k);
            values.push(IndicatorPoint::ready(ema));
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}

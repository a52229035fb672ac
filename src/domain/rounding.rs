//! Fixed-decimal rounding shared by metrics and backtest aggregation.
//!
//! Ties round towards positive infinity, so `-0.125` rounds to `-0.12` at two
//! decimals. Reports produced by earlier tooling rely on that behaviour.

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

/// Two-decimal rounding used for every reported metric.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// One-decimal rounding used for backtest rates and returns.
pub fn round1(value: f64) -> f64 {
    round_to(value, 1)
}

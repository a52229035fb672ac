//! Walk-forward backtest of the scoring rule.
//!
//! For every as-of index the scorer only sees closes up to and including that
//! index. Actionable decisions (anything but WAIT) are paired with the return
//! `lookahead_days` observations later; the returns are then summarised per
//! symbol and across the portfolio.

use crate::domain::allocation::SentimentContext;
use crate::domain::asset::Asset;
use crate::domain::ohlcv::{trailing_window, MarketSeries, OhlcvBar};
use crate::domain::rounding::round1;
use crate::domain::scoring::{score, ScoreInput, ScoringParams};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    /// Observations between a signal and the close it is judged against.
    pub lookahead_days: usize,
    /// Calendar days of history replayed.
    pub history_days: u32,
    /// Series shorter than this produce an empty outcome.
    pub min_history: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            lookahead_days: 20,
            history_days: 720,
            min_history: 220,
        }
    }
}

/// Forward-return statistics for one symbol. Percentages use one decimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestOutcome {
    pub symbol: String,
    pub signal_count: usize,
    pub hit_rate_pct: f64,
    pub avg_return_pct: f64,
    pub median_return_pct: f64,
}

impl BacktestOutcome {
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            signal_count: 0,
            hit_rate_pct: 0.0,
            avg_return_pct: 0.0,
            median_return_pct: 0.0,
        }
    }

    /// Summarise fractional returns (0.05 = +5%).
    pub fn from_returns(symbol: &str, returns: &[f64]) -> Self {
        if returns.is_empty() {
            return Self::empty(symbol);
        }
        let n = returns.len() as f64;
        let hits = returns.iter().filter(|&&r| r > 0.0).count() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        Self {
            symbol: symbol.to_string(),
            signal_count: returns.len(),
            hit_rate_pct: round1(hits / n * 100.0),
            avg_return_pct: round1(mean * 100.0),
            median_return_pct: round1(median(returns) * 100.0),
        }
    }
}

/// Median of `values`; the mean of the two middle values for even counts and
/// 0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Forward returns of every actionable as-of index in `closes`.
///
/// Indices start at [`ScoringParams::min_closes`] (never below 200) and stop
/// `lookahead` observations before the end. Volumes are not replayed, and the
/// budget is zero since only the action matters here.
pub fn forward_returns(
    asset: &Asset,
    closes: &[f64],
    fear_greed: f64,
    lookahead: usize,
    params: &ScoringParams,
) -> Vec<f64> {
    let start = params.min_closes();
    let end = closes.len().saturating_sub(lookahead);
    let mut returns = Vec::new();

    for i in start..end {
        let price = closes[i];
        if !(price.is_finite() && price > 0.0) {
            continue;
        }

        let input = ScoreInput {
            price,
            closes: &closes[..=i],
            volumes: None,
            avg_cost: asset.avg_cost,
            current_alloc: asset.current_alloc,
            target_alloc: asset.target_alloc,
            fear_greed,
            budget: 0.0,
        };
        if !score(&input, params).is_actionable() {
            continue;
        }

        match closes.get(i + lookahead) {
            Some(&future) if future.is_finite() && future > 0.0 => {
                returns.push((future - price) / price);
            }
            _ => continue,
        }
    }

    returns
}

/// Backtest one asset over its daily bars.
///
/// Only bars within `history_days` of the last bar are replayed. A replayed
/// series shorter than `min_history` yields an empty outcome.
pub fn backtest(
    asset: &Asset,
    bars: &[OhlcvBar],
    fear_greed: f64,
    config: &BacktestConfig,
    params: &ScoringParams,
) -> BacktestOutcome {
    let window = trailing_window(bars, config.history_days);
    let series = MarketSeries::from_bars(window);
    if series.len() < config.min_history {
        tracing::debug!(
            symbol = %asset.symbol,
            observations = series.len(),
            minimum = config.min_history,
            "history too short, skipping backtest"
        );
        return BacktestOutcome::empty(&asset.symbol);
    }

    let returns = forward_returns(asset, &series.closes, fear_greed, config.lookahead_days, params);
    let outcome = BacktestOutcome::from_returns(&asset.symbol, &returns);
    tracing::debug!(
        symbol = %outcome.symbol,
        signals = outcome.signal_count,
        hit_rate_pct = outcome.hit_rate_pct,
        "backtest finished"
    );
    outcome
}

/// Portfolio-wide summary.
///
/// Rates and returns are unweighted means over symbols, so a symbol without
/// signals contributes 0 just like any other symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioBacktestSummary {
    pub lookahead_days: usize,
    pub history_days: u32,
    pub fear_greed: SentimentContext,
    pub total_signals: usize,
    pub avg_hit_rate_pct: f64,
    pub avg_return_pct: f64,
    pub avg_median_return_pct: f64,
    pub per_symbol: Vec<BacktestOutcome>,
}

impl PortfolioBacktestSummary {
    pub fn aggregate(
        config: &BacktestConfig,
        fear_greed: SentimentContext,
        per_symbol: Vec<BacktestOutcome>,
    ) -> Self {
        let mean_of = |field: fn(&BacktestOutcome) -> f64| {
            if per_symbol.is_empty() {
                0.0
            } else {
                round1(per_symbol.iter().map(field).sum::<f64>() / per_symbol.len() as f64)
            }
        };
        let avg_hit_rate_pct = mean_of(|o| o.hit_rate_pct);
        let avg_return_pct = mean_of(|o| o.avg_return_pct);
        let avg_median_return_pct = mean_of(|o| o.median_return_pct);

        Self {
            lookahead_days: config.lookahead_days,
            history_days: config.history_days,
            fear_greed,
            total_signals: per_symbol.iter().map(|o| o.signal_count).sum(),
            avg_hit_rate_pct,
            avg_return_pct,
            avg_median_return_pct,
            per_symbol,
        }
    }
}

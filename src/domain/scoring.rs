//! Decision scorer.
//!
//! Five additive bands, evaluated in a fixed order that also fixes the order
//! of the reasons:
//!
//! | band        | max | rule                                             |
//! |-------------|-----|--------------------------------------------------|
//! | valuation   | 30  | distance of price from the long EMA              |
//! | oscillator  | 15  | RSI below 30 / below 50                          |
//! | trend       | 15  | price above the long EMA                         |
//! | sentiment   | 20  | fear/greed below 25 / below 45                   |
//! | allocation  | 20  | target minus current weight above 5 / above 0 pp |
//!
//! The total picks the action tier (see [`Action::from_score`]). Auxiliary
//! metrics are computed alongside and never feed back into the score.

use crate::domain::decision::{
    Action, Decision, DecisionMetrics, DecisionStatus, INSUFFICIENT_INDICATOR_DATA, INVALID_PRICE,
};
use crate::domain::indicator_helpers::{
    latest_indicators, series_high, trailing_low, volume_deviation_pct,
};
use crate::domain::rounding::{round2, round_to};

/// No score exists for fewer closes than this, whatever the indicator windows.
pub const MIN_SCORABLE_CLOSES: usize = 200;

/// Tunables for indicator windows and auxiliary metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringParams {
    pub rsi_period: usize,
    pub ema_period: usize,
    pub volume_window: usize,
    /// Absolute deviation (percent) at which a volume shock is flagged.
    pub volume_shock_pct: f64,
    pub support_lookback: usize,
    /// Added to the budget on STRONG_BUY.
    pub strong_buy_bonus: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ema_period: 200,
            volume_window: 20,
            volume_shock_pct: 50.0,
            support_lookback: 60,
            strong_buy_bonus: 100.0,
        }
    }
}

impl ScoringParams {
    /// Shortest close series that can be scored: both indicators defined and
    /// at least [`MIN_SCORABLE_CLOSES`] observations.
    pub fn min_closes(&self) -> usize {
        MIN_SCORABLE_CLOSES
            .max(self.ema_period)
            .max(self.rsi_period + 1)
    }
}

/// Everything the scorer reads for one asset at one point in time.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput<'a> {
    pub price: f64,
    pub closes: &'a [f64],
    pub volumes: Option<&'a [f64]>,
    pub avg_cost: f64,
    pub current_alloc: f64,
    pub target_alloc: f64,
    pub fear_greed: f64,
    pub budget: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Valuation,
    Oscillator,
    Trend,
    Sentiment,
    Allocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandScore {
    pub band: Band,
    pub points: u8,
    pub reason: String,
}

/// Score every band. Inputs past the indicator stage are plain numbers, so
/// this never fails.
pub fn score_bands(
    price: f64,
    rsi: f64,
    ema_long: f64,
    ema_period: usize,
    fear_greed: f64,
    current_alloc: f64,
    target_alloc: f64,
) -> [BandScore; 5] {
    [
        valuation_band(price, ema_long, ema_period),
        oscillator_band(rsi),
        trend_band(price, ema_long, ema_period),
        sentiment_band(fear_greed),
        allocation_band(current_alloc, target_alloc),
    ]
}

fn valuation_band(price: f64, ema_long: f64, ema_period: usize) -> BandScore {
    let diff_pct = (price - ema_long) / ema_long * 100.0;
    let (points, reason) = if diff_pct < -5.0 {
        (30, format!("Below EMA{ema_period} by more than 5% ({diff_pct:.1}%)"))
    } else if diff_pct < 0.0 {
        (20, format!("Below EMA{ema_period} ({diff_pct:.1}%)"))
    } else if diff_pct < 10.0 {
        (10, format!("Slightly above EMA{ema_period} (+{diff_pct:.1}%)"))
    } else {
        (0, format!("Extended above EMA{ema_period} (+{diff_pct:.1}%)"))
    };
    BandScore {
        band: Band::Valuation,
        points,
        reason,
    }
}

fn oscillator_band(rsi: f64) -> BandScore {
    let (points, reason) = if rsi < 30.0 {
        (15, format!("RSI oversold ({rsi:.0})"))
    } else if rsi < 50.0 {
        (10, format!("RSI low ({rsi:.0})"))
    } else {
        (0, format!("RSI neutral or high ({rsi:.0})"))
    };
    BandScore {
        band: Band::Oscillator,
        points,
        reason,
    }
}

fn trend_band(price: f64, ema_long: f64, ema_period: usize) -> BandScore {
    let (points, reason) = if price > ema_long {
        (15, format!("Uptrend (above EMA{ema_period})"))
    } else {
        (0, format!("Downtrend (below EMA{ema_period})"))
    };
    BandScore {
        band: Band::Trend,
        points,
        reason,
    }
}

fn sentiment_band(fear_greed: f64) -> BandScore {
    let (points, reason) = if fear_greed < 25.0 {
        (20, format!("Extreme fear ({fear_greed:.0})"))
    } else if fear_greed < 45.0 {
        (10, format!("Market fear ({fear_greed:.0})"))
    } else {
        (0, format!("No fear in market ({fear_greed:.0})"))
    };
    BandScore {
        band: Band::Sentiment,
        points,
        reason,
    }
}

fn allocation_band(current_alloc: f64, target_alloc: f64) -> BandScore {
    let gap_pct = (target_alloc - current_alloc) * 100.0;
    let (points, reason) = if gap_pct > 5.0 {
        (20, format!("Below target by more than 5% (gap: {gap_pct:.1}%)"))
    } else if gap_pct > 0.0 {
        (10, format!("Below target (gap: {gap_pct:.1}%)"))
    } else {
        (0, format!("At or above target (gap: {gap_pct:.1}%)"))
    };
    BandScore {
        band: Band::Allocation,
        points,
        reason,
    }
}

/// Score one asset.
///
/// Returns the insufficient-data decision when the price is not a positive
/// finite number, `closes` is shorter than [`ScoringParams::min_closes`] or
/// either indicator is undefined for `closes`.
pub fn score(input: &ScoreInput<'_>, params: &ScoringParams) -> Decision {
    if !(input.price.is_finite() && input.price > 0.0) {
        return Decision::insufficient(INVALID_PRICE);
    }
    if input.closes.len() < params.min_closes() {
        return Decision::insufficient(INSUFFICIENT_INDICATOR_DATA);
    }

    let snapshot = latest_indicators(input.closes, params.rsi_period, params.ema_period);
    let Some((rsi, ema_long)) = snapshot.both() else {
        return Decision::insufficient(INSUFFICIENT_INDICATOR_DATA);
    };

    let bands = score_bands(
        input.price,
        rsi,
        ema_long,
        params.ema_period,
        input.fear_greed,
        input.current_alloc,
        input.target_alloc,
    );
    let score: u8 = bands.iter().map(|b| b.points).sum();
    let action = Action::from_score(score);
    let budget = input.budget.max(0.0);
    let recommend_usd = round_to(action.spend(budget, params.strong_buy_bonus), 0);

    Decision {
        status: DecisionStatus::Ok,
        score,
        action,
        recommend_usd,
        reasons: bands.into_iter().map(|b| b.reason).collect(),
        metrics: auxiliary_metrics(input, rsi, ema_long, params),
    }
}

fn auxiliary_metrics(
    input: &ScoreInput<'_>,
    rsi: f64,
    ema_long: f64,
    params: &ScoringParams,
) -> DecisionMetrics {
    let price = input.price;

    let avg_cost_available = input.avg_cost > 0.0;
    let (avg_cost_diff_abs, avg_cost_diff_pct, is_above_avg_cost) = if avg_cost_available {
        let diff = price - input.avg_cost;
        (
            Some(round2(diff)),
            Some(round2(diff / input.avg_cost * 100.0)),
            Some(price > input.avg_cost),
        )
    } else {
        (None, None, None)
    };

    let volume_shock = input
        .volumes
        .and_then(|v| volume_deviation_pct(v, params.volume_window));

    let dist_from_ath_pct = series_high(input.closes)
        .filter(|&ath| ath > 0.0)
        .map(|ath| round2((price - ath) / ath * 100.0));

    let support_distance = trailing_low(input.closes, params.support_lookback)
        .filter(|&support| support > 0.0)
        .map(|support| round2(price - support));

    let upside = round2((ema_long - price).abs());
    let risk_reward_ratio = support_distance
        .filter(|&downside| downside > 0.0)
        .map(|downside| round2(upside / downside));

    DecisionMetrics {
        avg_cost_available,
        avg_cost_diff_abs,
        avg_cost_diff_pct,
        is_above_avg_cost,
        rsi: Some(round2(rsi)),
        ema_long: Some(round2(ema_long)),
        volume_shock_pct: volume_shock.map(round2),
        volume_shock_flag: volume_shock.map(|pct| pct.abs() >= params.volume_shock_pct),
        dist_from_ath_pct,
        support_distance,
        risk_reward_ratio,
    }
}

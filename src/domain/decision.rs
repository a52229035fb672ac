//! Decision types produced by the scorer.
//!
//! A [`Decision`] serializes flat: score, action and reasons sit next to the
//! metric fields, and absent metrics are written as `null`.

use serde::Serialize;
use std::fmt;

pub const STRONG_BUY_MIN_SCORE: u8 = 85;
pub const BUY_MIN_SCORE: u8 = 60;
pub const ACCUMULATE_MIN_SCORE: u8 = 40;

pub const INSUFFICIENT_INDICATOR_DATA: &str = "Insufficient indicator data";
pub const INVALID_PRICE: &str = "Invalid or missing price";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Wait,
    Accumulate,
    Buy,
    StrongBuy,
}

impl Action {
    /// Tier for a total score. Lower bounds are inclusive.
    pub fn from_score(score: u8) -> Self {
        if score >= STRONG_BUY_MIN_SCORE {
            Action::StrongBuy
        } else if score >= BUY_MIN_SCORE {
            Action::Buy
        } else if score >= ACCUMULATE_MIN_SCORE {
            Action::Accumulate
        } else {
            Action::Wait
        }
    }

    /// Unrounded spend for this tier.
    pub fn spend(self, budget: f64, strong_buy_bonus: f64) -> f64 {
        match self {
            Action::StrongBuy => budget + strong_buy_bonus,
            Action::Buy => budget,
            Action::Accumulate => budget * 0.5,
            Action::Wait => 0.0,
        }
    }

    pub fn is_actionable(self) -> bool {
        self != Action::Wait
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Wait => "WAIT",
            Action::Accumulate => "ACCUMULATE",
            Action::Buy => "BUY",
            Action::StrongBuy => "STRONG_BUY",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecisionStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
}

/// Informational values reported alongside the score. They never change it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecisionMetrics {
    pub avg_cost_available: bool,
    pub avg_cost_diff_abs: Option<f64>,
    pub avg_cost_diff_pct: Option<f64>,
    pub is_above_avg_cost: Option<bool>,
    pub rsi: Option<f64>,
    pub ema_long: Option<f64>,
    pub volume_shock_pct: Option<f64>,
    pub volume_shock_flag: Option<bool>,
    pub dist_from_ath_pct: Option<f64>,
    pub support_distance: Option<f64>,
    pub risk_reward_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub status: DecisionStatus,
    pub score: u8,
    pub action: Action,
    pub recommend_usd: f64,
    pub reasons: Vec<String>,
    #[serde(flatten)]
    pub metrics: DecisionMetrics,
}

impl Decision {
    /// The hard-stop result: zero score, WAIT, one reason.
    pub fn insufficient(reason: &str) -> Self {
        Self {
            status: DecisionStatus::InsufficientData,
            score: 0,
            action: Action::Wait,
            recommend_usd: 0.0,
            reasons: vec![reason.to_string()],
            metrics: DecisionMetrics::default(),
        }
    }

    pub fn is_insufficient(&self) -> bool {
        self.status == DecisionStatus::InsufficientData
    }

    /// Scored normally and recommends spending.
    pub fn is_actionable(&self) -> bool {
        !self.is_insufficient() && self.action.is_actionable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_are_inclusive() {
        assert_eq!(Action::from_score(39), Action::Wait);
        assert_eq!(Action::from_score(40), Action::Accumulate);
        assert_eq!(Action::from_score(59), Action::Accumulate);
        assert_eq!(Action::from_score(60), Action::Buy);
        assert_eq!(Action::from_score(84), Action::Buy);
        assert_eq!(Action::from_score(85), Action::StrongBuy);
        assert_eq!(Action::from_score(0), Action::Wait);
        assert_eq!(Action::from_score(100), Action::StrongBuy);
    }

    #[test]
    fn spend_per_tier() {
        assert_eq!(Action::StrongBuy.spend(300.0, 100.0), 400.0);
        assert_eq!(Action::Buy.spend(300.0, 100.0), 300.0);
        assert_eq!(Action::Accumulate.spend(300.0, 100.0), 150.0);
        assert_eq!(Action::Wait.spend(300.0, 100.0), 0.0);
    }

    #[test]
    fn action_serializes_without_decoration() {
        assert_eq!(serde_json::to_string(&Action::StrongBuy).unwrap(), "\"STRONG_BUY\"");
        assert_eq!(serde_json::to_string(&Action::Wait).unwrap(), "\"WAIT\"");
        assert_eq!(Action::Accumulate.to_string(), "ACCUMULATE");
    }

    #[test]
    fn insufficient_decision_shape() {
        let d = Decision::insufficient(INSUFFICIENT_INDICATOR_DATA);
        assert!(d.is_insufficient());
        assert!(!d.is_actionable());
        assert_eq!(d.score, 0);
        assert_eq!(d.action, Action::Wait);
        assert_eq!(d.recommend_usd, 0.0);
        assert_eq!(d.reasons, vec![INSUFFICIENT_INDICATOR_DATA.to_string()]);

        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["status"], "Insufficient Data");
    }

    #[test]
    fn metrics_are_flattened_with_nulls() {
        let d = Decision {
            status: DecisionStatus::Ok,
            score: 45,
            action: Action::Accumulate,
            recommend_usd: 150.0,
            reasons: vec!["a".into()],
            metrics: DecisionMetrics {
                rsi: Some(41.25),
                ema_long: Some(99.5),
                ..DecisionMetrics::default()
            },
        };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["status"], "OK");
        assert_eq!(json["action"], "ACCUMULATE");
        assert_eq!(json["rsi"], 41.25);
        assert_eq!(json["ema_long"], 99.5);
        assert_eq!(json["avg_cost_available"], false);
        assert!(json["avg_cost_diff_abs"].is_null());
        assert!(json["risk_reward_ratio"].is_null());
        assert!(json.get("metrics").is_none());
    }
}

//! Live analysis: score each holding against its current market series.

use crate::domain::allocation::{AllocationConfig, SentimentContext};
use crate::domain::asset::Asset;
use crate::domain::decision::{Decision, DecisionStatus};
use crate::domain::ohlcv::MarketSeries;
use crate::domain::scoring::{score, ScoreInput, ScoringParams};
use serde::Serialize;

/// Result for one holding. Scored entries carry the flattened decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AssetAnalysis {
    Scored {
        symbol: String,
        price: f64,
        #[serde(flatten)]
        decision: Decision,
    },
    Insufficient {
        symbol: String,
        status: DecisionStatus,
    },
}

impl AssetAnalysis {
    pub fn insufficient(symbol: &str) -> Self {
        AssetAnalysis::Insufficient {
            symbol: symbol.to_string(),
            status: DecisionStatus::InsufficientData,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            AssetAnalysis::Scored { symbol, .. } | AssetAnalysis::Insufficient { symbol, .. } => {
                symbol
            }
        }
    }

    pub fn decision(&self) -> Option<&Decision> {
        match self {
            AssetAnalysis::Scored { decision, .. } => Some(decision),
            AssetAnalysis::Insufficient { .. } => None,
        }
    }
}

/// Score one holding.
///
/// A missing price, a series shorter than the indicator window or an
/// indicator hard stop all collapse into [`AssetAnalysis::Insufficient`].
pub fn analyze_asset(
    asset: &Asset,
    series: &MarketSeries,
    fear_greed: f64,
    budget: f64,
    params: &ScoringParams,
) -> AssetAnalysis {
    let price = series.latest_price;
    if !(price.is_finite() && price > 0.0) || series.len() < params.min_closes() {
        return AssetAnalysis::insufficient(&asset.symbol);
    }

    let input = ScoreInput {
        price,
        closes: &series.closes,
        volumes: Some(series.volumes.as_slice()),
        avg_cost: asset.avg_cost,
        current_alloc: asset.current_alloc,
        target_alloc: asset.target_alloc,
        fear_greed,
        budget,
    };
    let decision = score(&input, params);
    if decision.is_insufficient() {
        return AssetAnalysis::insufficient(&asset.symbol);
    }

    AssetAnalysis::Scored {
        symbol: asset.symbol.clone(),
        price,
        decision,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub budget_remaining: f64,
    pub fear_greed: SentimentContext,
    pub analysis: Vec<AssetAnalysis>,
}

/// Score every holding with the sentiment reading of its asset class.
///
/// Each holding is scored independently; the budget is the whole remaining
/// budget for every one of them.
pub fn analyze_portfolio(
    holdings: &[(Asset, MarketSeries)],
    sentiment: SentimentContext,
    allocation: &AllocationConfig,
    budget: f64,
    params: &ScoringParams,
) -> AnalysisReport {
    let analysis = holdings
        .iter()
        .map(|(asset, series)| {
            let fear_greed = sentiment.for_symbol(&asset.symbol, allocation);
            analyze_asset(asset, series, fear_greed, budget, params)
        })
        .collect();

    AnalysisReport {
        budget_remaining: budget,
        fear_greed: sentiment,
        analysis,
    }
}

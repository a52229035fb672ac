//! Allocation targets and per-asset-class sentiment routing.
//!
//! Target weights come from an explicit [`AllocationConfig`] value built from
//! configuration, never from process-wide state.

use serde::Serialize;
use std::collections::BTreeSet;

pub const DEFAULT_CRYPTO_SYMBOLS: &[&str] = &["BTC", "ETH", "SOL"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Crypto,
    Equity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationConfig {
    pub crypto_symbols: BTreeSet<String>,
    /// Target weight of each crypto holding, in percent.
    pub crypto_target_pct: f64,
    /// Target weight of all equity holdings together, in percent.
    pub stock_total_target_pct: f64,
    /// Number of equity holdings sharing `stock_total_target_pct`.
    pub stock_count: usize,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            crypto_symbols: DEFAULT_CRYPTO_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            crypto_target_pct: 10.0,
            stock_total_target_pct: 70.0,
            stock_count: 0,
        }
    }
}

impl AllocationConfig {
    pub fn class_of(&self, symbol: &str) -> AssetClass {
        if self.crypto_symbols.contains(&normalize_symbol(symbol)) {
            AssetClass::Crypto
        } else {
            AssetClass::Equity
        }
    }

    /// Derived target weight for `symbol` as a fraction.
    pub fn target_alloc_for(&self, symbol: &str) -> f64 {
        match self.class_of(symbol) {
            AssetClass::Crypto => self.crypto_target_pct / 100.0,
            AssetClass::Equity if self.stock_count == 0 => 0.0,
            AssetClass::Equity => self.stock_total_target_pct / self.stock_count as f64 / 100.0,
        }
    }

    /// Fill in `stock_count` from the holdings when it was left at 0.
    pub fn with_stock_count_from<'a>(mut self, symbols: impl IntoIterator<Item = &'a str>) -> Self {
        if self.stock_count == 0 {
            self.stock_count = symbols
                .into_iter()
                .filter(|s| self.class_of(s) == AssetClass::Equity)
                .count();
        }
        self
    }
}

/// Split a comma separated symbol list, upper-casing and dropping blanks and
/// repeats.
pub fn parse_symbols(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(normalize_symbol)
        .filter(|s| !s.is_empty())
        .collect()
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Fear/greed readings for both asset classes, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentContext {
    pub crypto: f64,
    pub equity: f64,
}

impl SentimentContext {
    pub fn new(crypto: f64, equity: f64) -> Self {
        Self {
            crypto: clamp_index(crypto),
            equity: clamp_index(equity),
        }
    }

    /// The reading that applies to `symbol`.
    pub fn for_symbol(&self, symbol: &str, allocation: &AllocationConfig) -> f64 {
        match allocation.class_of(symbol) {
            AssetClass::Crypto => self.crypto,
            AssetClass::Equity => self.equity,
        }
    }
}

fn clamp_index(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        50.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_crypto_set() {
        let cfg = AllocationConfig::default();
        assert_eq!(cfg.class_of("btc"), AssetClass::Crypto);
        assert_eq!(cfg.class_of(" ETH "), AssetClass::Crypto);
        assert_eq!(cfg.class_of("VOO"), AssetClass::Equity);
    }

    #[test]
    fn crypto_target_is_per_symbol_pct() {
        let cfg = AllocationConfig::default();
        assert!((cfg.target_alloc_for("BTC") - 0.10).abs() < 1e-12);
    }

    #[test]
    fn stock_target_splits_total() {
        let cfg = AllocationConfig {
            stock_count: 4,
            ..AllocationConfig::default()
        };
        assert!((cfg.target_alloc_for("VOO") - 0.175).abs() < 1e-12);
    }

    #[test]
    fn stock_target_zero_without_count() {
        let cfg = AllocationConfig::default();
        assert_eq!(cfg.target_alloc_for("VOO"), 0.0);
    }

    #[test]
    fn stock_count_derived_from_holdings() {
        let cfg = AllocationConfig::default().with_stock_count_from(["BTC", "VOO", "QQQ", "ETH"]);
        assert_eq!(cfg.stock_count, 2);
        assert!((cfg.target_alloc_for("QQQ") - 0.35).abs() < 1e-12);

        let fixed = AllocationConfig {
            stock_count: 7,
            ..AllocationConfig::default()
        }
        .with_stock_count_from(["VOO"]);
        assert_eq!(fixed.stock_count, 7);
    }

    #[test]
    fn parse_symbols_normalizes() {
        let set = parse_symbols("btc, ETH,,sol,BTC ");
        let symbols: Vec<&str> = set.iter().map(String::as_str).collect();
        assert_eq!(symbols, vec!["BTC", "ETH", "SOL"]);
    }

    #[test]
    fn sentiment_routes_by_class() {
        let cfg = AllocationConfig::default();
        let ctx = SentimentContext::new(18.0, 62.0);
        assert_eq!(ctx.for_symbol("BTC", &cfg), 18.0);
        assert_eq!(ctx.for_symbol("VOO", &cfg), 62.0);
    }

    #[test]
    fn sentiment_is_clamped() {
        let ctx = SentimentContext::new(-5.0, 140.0);
        assert_eq!(ctx.crypto, 0.0);
        assert_eq!(ctx.equity, 100.0);
        assert_eq!(SentimentContext::new(f64::NAN, 10.0).crypto, 50.0);
    }
}

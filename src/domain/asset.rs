//! Portfolio holdings as read from the holdings source.

use serde::Serialize;

/// One holding. Allocations are fractions of the portfolio in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    pub symbol: String,
    pub avg_cost: f64,
    pub current_alloc: f64,
    pub target_alloc: f64,
    pub qty: f64,
}

impl Asset {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            avg_cost: 0.0,
            current_alloc: 0.0,
            target_alloc: 0.0,
            qty: 0.0,
        }
    }

    pub fn with_avg_cost(mut self, avg_cost: f64) -> Self {
        self.avg_cost = avg_cost;
        self
    }

    pub fn with_allocation(mut self, current: f64, target: f64) -> Self {
        self.current_alloc = current;
        self.target_alloc = target;
        self
    }

    pub fn with_qty(mut self, qty: f64) -> Self {
        self.qty = qty;
        self
    }
}

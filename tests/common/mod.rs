#![allow(dead_code)]

use accumulator::domain::asset::Asset;
use accumulator::domain::error::AccumulatorError;
pub use accumulator::domain::ohlcv::OhlcvBar;
use accumulator::ports::data_port::DataPort;
use accumulator::ports::portfolio_port::PortfolioPort;
use chrono::NaiveDate;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        _lookback_days: u32,
    ) -> Result<Vec<OhlcvBar>, AccumulatorError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(AccumulatorError::DataSource {
                reason: reason.clone(),
            });
        }
        self.data
            .get(symbol)
            .cloned()
            .ok_or_else(|| AccumulatorError::NoData {
                symbol: symbol.to_string(),
            })
    }
}

pub struct MockPortfolio {
    pub holdings: Vec<Asset>,
    pub budget: Option<f64>,
}

impl MockPortfolio {
    pub fn new(holdings: Vec<Asset>) -> Self {
        Self {
            holdings,
            budget: None,
        }
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }
}

impl PortfolioPort for MockPortfolio {
    fn holdings(&self) -> Result<Vec<Asset>, AccumulatorError> {
        Ok(self.holdings.clone())
    }

    fn remaining_budget(&self) -> Result<Option<f64>, AccumulatorError> {
        Ok(self.budget)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily bars from `closes`, one calendar day apart starting 2022-01-01.
pub fn bars_from_closes(symbol: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2022, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            symbol: symbol.to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: Some(1_000.0),
        })
        .collect()
}

/// 200 flat closes at 100 followed by a 15 day slide of 2 per day.
pub fn dip_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 200];
    closes.extend((1..=15).map(|i| 100.0 - i as f64 * 2.0));
    closes
}

/// Steady climb: every close 0.5 above the previous one.
pub fn rising_closes(count: usize, start: f64) -> Vec<f64> {
    (0..count).map(|i| start + i as f64 * 0.5).collect()
}

/// Saw-tooth series: a slow climb with a sharp pullback every `period` days.
pub fn sawtooth_closes(count: usize, period: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let base = 100.0 + i as f64 * 0.2;
            if i % period >= period - 5 {
                base * 0.85
            } else {
                base
            }
        })
        .collect()
}

pub fn price_csv(closes: &[f64]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for bar in bars_from_closes("X", closes) {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.date,
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume.unwrap_or_default()
        ));
    }
    out
}

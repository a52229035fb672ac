//! CSV file market data adapter.
//!
//! One file per symbol, `<base>/<SYMBOL>.csv`, with the header
//! `date,open,high,low,close,volume`. Crypto tickers exported with a quote
//! currency suffix (`BTC-USD.csv`) are found as well.

use crate::domain::error::AccumulatorError;
use crate::domain::ohlcv::{trailing_window, OhlcvBar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const QUOTE_SUFFIX: &str = "-USD";

#[derive(Debug, Deserialize)]
struct PriceRow {
    date: String,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    #[serde(default)]
    close: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> Option<PathBuf> {
        let symbol = symbol.trim().to_uppercase();
        [format!("{symbol}.csv"), format!("{symbol}{QUOTE_SUFFIX}.csv")]
            .into_iter()
            .map(|name| self.base_path.join(name))
            .find(|path| path.is_file())
    }
}

/// Read one price file, oldest bar first.
pub fn read_price_file(path: &Path, symbol: &str) -> Result<Vec<OhlcvBar>, AccumulatorError> {
    let content = fs::read_to_string(path).map_err(|e| AccumulatorError::DataSource {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let mut bars = Vec::new();

    for result in rdr.deserialize::<PriceRow>() {
        let row = result?;
        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
            AccumulatorError::DataSource {
                reason: format!("invalid date {:?} in {}: {}", row.date, path.display(), e),
            }
        })?;
        // provider gaps: rows without a close carry no price information
        let Some(close) = row.close else {
            continue;
        };

        bars.push(OhlcvBar {
            symbol: symbol.to_string(),
            date,
            open: row.open.unwrap_or(close),
            high: row.high.unwrap_or(close),
            low: row.low.unwrap_or(close),
            close,
            volume: row.volume,
        });
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<OhlcvBar>, AccumulatorError> {
        let path = self.csv_path(symbol).ok_or_else(|| AccumulatorError::NoData {
            symbol: symbol.to_string(),
        })?;
        let mut bars = read_price_file(&path, symbol)?;
        let start = bars.len() - trailing_window(&bars, lookback_days).len();
        bars.drain(..start);

        tracing::debug!(symbol, bars = bars.len(), path = %path.display(), "loaded price history");
        Ok(bars)
    }
}

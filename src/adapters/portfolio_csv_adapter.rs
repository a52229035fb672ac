//! Holdings and budget log CSV adapter.
//!
//! Holdings: `symbol,name,qty,avg_cost,current_alloc,target_alloc`, matched by
//! header name. Cells are spreadsheet exports, so numbers may carry currency
//! signs, thousands separators or a trailing `%`. Allocation cells are
//! percentages.
//!
//! Budget log: any CSV with a `remaining` column; the last row wins.

use crate::domain::allocation::AllocationConfig;
use crate::domain::asset::Asset;
use crate::domain::error::AccumulatorError;
use crate::ports::portfolio_port::PortfolioPort;
use csv::StringRecord;
use std::path::{Path, PathBuf};

/// Strip everything except digits, `.` and `-`, then parse. Unparsable is 0.
pub fn clean_num(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

struct Columns {
    symbol: usize,
    qty: Option<usize>,
    avg_cost: Option<usize>,
    current_alloc: Option<usize>,
    target_alloc: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, AccumulatorError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let symbol = find("symbol").ok_or_else(|| AccumulatorError::Portfolio {
            reason: "holdings file has no symbol column".to_string(),
        })?;
        Ok(Self {
            symbol,
            qty: find("qty"),
            avg_cost: find("avg_cost"),
            current_alloc: find("current_alloc"),
            target_alloc: find("target_alloc"),
        })
    }
}

fn cell<'r>(record: &'r StringRecord, idx: Option<usize>) -> &'r str {
    idx.and_then(|i| record.get(i)).unwrap_or("").trim()
}

#[derive(Debug)]
pub struct PortfolioCsvAdapter {
    holdings_path: PathBuf,
    budget_path: Option<PathBuf>,
    allocation: AllocationConfig,
}

impl PortfolioCsvAdapter {
    pub fn new(holdings_path: PathBuf, allocation: AllocationConfig) -> Self {
        Self {
            holdings_path,
            budget_path: None,
            allocation,
        }
    }

    pub fn with_budget_file(mut self, path: PathBuf) -> Self {
        self.budget_path = Some(path);
        self
    }

    fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>, AccumulatorError> {
        csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| AccumulatorError::Portfolio {
                reason: format!("failed to open {}: {}", path.display(), e),
            })
    }
}

impl PortfolioPort for PortfolioCsvAdapter {
    fn holdings(&self) -> Result<Vec<Asset>, AccumulatorError> {
        let mut rdr = Self::reader(&self.holdings_path)?;
        let columns = Columns::from_headers(rdr.headers()?)?;

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let symbol = cell(&record, Some(columns.symbol)).to_uppercase();
            if symbol.is_empty() {
                continue;
            }
            let target = cell(&record, columns.target_alloc);
            let target = (!target.is_empty()).then(|| clean_num(target) / 100.0);
            let asset = Asset::new(symbol)
                .with_qty(clean_num(cell(&record, columns.qty)))
                .with_avg_cost(clean_num(cell(&record, columns.avg_cost)))
                .with_allocation(
                    clean_num(cell(&record, columns.current_alloc)) / 100.0,
                    target.unwrap_or(0.0),
                );
            rows.push((asset, target.is_some()));
        }

        let allocation = self
            .allocation
            .clone()
            .with_stock_count_from(rows.iter().map(|(a, _)| a.symbol.as_str()));

        let holdings: Vec<Asset> = rows
            .into_iter()
            .map(|(asset, has_target)| {
                if has_target {
                    asset
                } else {
                    let target = allocation.target_alloc_for(&asset.symbol);
                    let current = asset.current_alloc;
                    asset.with_allocation(current, target)
                }
            })
            .collect();

        tracing::debug!(
            count = holdings.len(),
            path = %self.holdings_path.display(),
            "loaded holdings"
        );
        Ok(holdings)
    }

    fn remaining_budget(&self) -> Result<Option<f64>, AccumulatorError> {
        let Some(path) = &self.budget_path else {
            return Ok(None);
        };
        let mut rdr = Self::reader(path)?;
        let idx = rdr
            .headers()?
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case("remaining"))
            .ok_or_else(|| AccumulatorError::Portfolio {
                reason: format!("{} has no remaining column", path.display()),
            })?;

        let mut last = None;
        for result in rdr.records() {
            let record = result?;
            let value = cell(&record, Some(idx));
            if !value.is_empty() {
                last = Some(clean_num(value));
            }
        }
        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn clean_num_strips_formatting() {
        assert_eq!(clean_num("$1,234.50"), 1234.5);
        assert_eq!(clean_num("12.5%"), 12.5);
        assert_eq!(clean_num(" -3 "), -3.0);
        assert_eq!(clean_num(""), 0.0);
        assert_eq!(clean_num("n/a"), 0.0);
        assert_eq!(clean_num("1.2.3"), 0.0);
    }

    #[test]
    fn holdings_parse_and_scale_percentages() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "holdings.csv",
            "symbol,name,qty,avg_cost,current_alloc,target_alloc\n\
             VOO,Vanguard S&P,\"1,200\",$410.25,35%,40%\n\
             btc,Bitcoin,0.5,\"$30,000\",8,\n",
        );
        let adapter = PortfolioCsvAdapter::new(path, AllocationConfig::default());

        let holdings = adapter.holdings().unwrap();
        assert_eq!(holdings.len(), 2);

        let voo = &holdings[0];
        assert_eq!(voo.symbol, "VOO");
        assert_eq!(voo.qty, 1200.0);
        assert_eq!(voo.avg_cost, 410.25);
        assert_eq!(voo.current_alloc, 0.35);
        assert_eq!(voo.target_alloc, 0.40);

        let btc = &holdings[1];
        assert_eq!(btc.symbol, "BTC");
        assert_eq!(btc.avg_cost, 30000.0);
        assert_eq!(btc.current_alloc, 0.08);
        assert_eq!(btc.target_alloc, 0.10);
    }

    #[test]
    fn empty_target_uses_derived_equity_share() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "holdings.csv",
            "symbol,avg_cost,current_alloc,target_alloc\n\
             VOO,400,30,\n\
             QQQ,300,20,\n\
             ETH,2000,5,\n",
        );
        let adapter = PortfolioCsvAdapter::new(path, AllocationConfig::default());

        let holdings = adapter.holdings().unwrap();
        assert_eq!(holdings[0].target_alloc, 0.35);
        assert_eq!(holdings[1].target_alloc, 0.35);
        assert_eq!(holdings[2].target_alloc, 0.10);
    }

    #[test]
    fn blank_symbols_are_dropped() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "holdings.csv",
            "symbol,avg_cost\nVOO,1\n,2\n   ,3\nQQQ,4\n",
        );
        let adapter = PortfolioCsvAdapter::new(path, AllocationConfig::default());

        let symbols: Vec<_> = adapter
            .holdings()
            .unwrap()
            .into_iter()
            .map(|a| a.symbol)
            .collect();
        assert_eq!(symbols, vec!["VOO", "QQQ"]);
    }

    #[test]
    fn missing_symbol_column_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "holdings.csv", "ticker,avg_cost\nVOO,1\n");
        let adapter = PortfolioCsvAdapter::new(path, AllocationConfig::default());
        assert!(matches!(
            adapter.holdings().unwrap_err(),
            AccumulatorError::Portfolio { .. }
        ));
    }

    #[test]
    fn missing_holdings_file_is_an_error() {
        let adapter = PortfolioCsvAdapter::new(
            PathBuf::from("/nonexistent/holdings.csv"),
            AllocationConfig::default(),
        );
        assert!(adapter.holdings().is_err());
    }

    #[test]
    fn remaining_budget_reads_last_row() {
        let dir = TempDir::new().unwrap();
        let holdings = write(&dir, "holdings.csv", "symbol\nVOO\n");
        let budget = write(
            &dir,
            "budget.csv",
            "date,spent,remaining\n2024-01-01,0,\"$1,000\"\n2024-02-01,250,$750.00\n2024-03-01,,\n",
        );
        let adapter = PortfolioCsvAdapter::new(holdings, AllocationConfig::default())
            .with_budget_file(budget);
        assert_eq!(adapter.remaining_budget().unwrap(), Some(750.0));
    }

    #[test]
    fn remaining_budget_without_file_is_none() {
        let dir = TempDir::new().unwrap();
        let holdings = write(&dir, "holdings.csv", "symbol\nVOO\n");
        let adapter = PortfolioCsvAdapter::new(holdings, AllocationConfig::default());
        assert_eq!(adapter.remaining_budget().unwrap(), None);
    }

    #[test]
    fn empty_budget_log_is_none() {
        let dir = TempDir::new().unwrap();
        let holdings = write(&dir, "holdings.csv", "symbol\nVOO\n");
        let budget = write(&dir, "budget.csv", "date,remaining\n");
        let adapter = PortfolioCsvAdapter::new(holdings, AllocationConfig::default())
            .with_budget_file(budget);
        assert_eq!(adapter.remaining_budget().unwrap(), None);
    }
}

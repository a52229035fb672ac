//! Plain-text table report adapter for terminal use.

use crate::domain::analysis::{AnalysisReport, AssetAnalysis};
use crate::domain::backtest::PortfolioBacktestSummary;
use crate::domain::decision::Action;
use crate::domain::error::AccumulatorError;
use crate::ports::report_port::ReportPort;
use std::io::Write;

pub fn action_label(action: Action) -> &'static str {
    match action {
        Action::StrongBuy => "STRONG_BUY 🚀",
        Action::Buy => "BUY ✅",
        Action::Accumulate => "ACCUMULATE ⚠️",
        Action::Wait => "WAIT",
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "-".to_string(),
    }
}

#[derive(Debug, Default)]
pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for TextReportAdapter {
    fn write_analysis(
        &self,
        report: &AnalysisReport,
        out: &mut dyn Write,
    ) -> Result<(), AccumulatorError> {
        writeln!(out, "Budget remaining: ${:.2}", report.budget_remaining)?;
        writeln!(
            out,
            "Fear & greed: crypto {:.0}, equity {:.0}",
            report.fear_greed.crypto, report.fear_greed.equity
        )?;
        writeln!(out)?;
        writeln!(
            out,
            "{:<8} {:>12} {:>5} {:<16} {:>10} {:>7} {:>12}",
            "SYMBOL", "PRICE", "SCORE", "ACTION", "BUY USD", "RSI", "EMA"
        )?;

        for entry in &report.analysis {
            match entry {
                AssetAnalysis::Scored {
                    symbol,
                    price,
                    decision,
                } => {
                    writeln!(
                        out,
                        "{:<8} {:>12.2} {:>5} {:<16} {:>10.0} {:>7} {:>12}",
                        symbol,
                        price,
                        decision.score,
                        action_label(decision.action),
                        decision.recommend_usd,
                        fmt_opt(decision.metrics.rsi, 1),
                        fmt_opt(decision.metrics.ema_long, 2),
                    )?;
                    for reason in &decision.reasons {
                        writeln!(out, "         - {reason}")?;
                    }
                }
                AssetAnalysis::Insufficient { symbol, .. } => {
                    writeln!(out, "{symbol:<8} insufficient data")?;
                }
            }
        }
        Ok(())
    }

    fn write_backtest(
        &self,
        summary: &PortfolioBacktestSummary,
        out: &mut dyn Write,
    ) -> Result<(), AccumulatorError> {
        writeln!(
            out,
            "Backtest: {} day lookahead over {} days of history",
            summary.lookahead_days, summary.history_days
        )?;
        writeln!(
            out,
            "Signals: {}  hit rate: {:.1}%  avg return: {:.1}%  median return: {:.1}%",
            summary.total_signals,
            summary.avg_hit_rate_pct,
            summary.avg_return_pct,
            summary.avg_median_return_pct
        )?;
        writeln!(out)?;
        writeln!(
            out,
            "{:<8} {:>8} {:>10} {:>10} {:>10}",
            "SYMBOL", "SIGNALS", "HIT %", "AVG %", "MEDIAN %"
        )?;
        for outcome in &summary.per_symbol {
            writeln!(
                out,
                "{:<8} {:>8} {:>10.1} {:>10.1} {:>10.1}",
                outcome.symbol,
                outcome.signal_count,
                outcome.hit_rate_pct,
                outcome.avg_return_pct,
                outcome.median_return_pct
            )?;
        }
        Ok(())
    }
}

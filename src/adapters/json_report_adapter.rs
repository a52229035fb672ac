//! JSON report adapter.

use crate::domain::analysis::AnalysisReport;
use crate::domain::backtest::PortfolioBacktestSummary;
use crate::domain::error::AccumulatorError;
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Default)]
pub struct JsonReportAdapter {
    compact: bool,
}

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-line output instead of pretty-printed.
    pub fn compact() -> Self {
        Self { compact: true }
    }

    fn write<T: Serialize>(&self, value: &T, out: &mut dyn Write) -> Result<(), AccumulatorError> {
        if self.compact {
            serde_json::to_writer(&mut *out, value)?;
        } else {
            serde_json::to_writer_pretty(&mut *out, value)?;
        }
        writeln!(out)?;
        Ok(())
    }
}

impl ReportPort for JsonReportAdapter {
    fn write_analysis(
        &self,
        report: &AnalysisReport,
        out: &mut dyn Write,
    ) -> Result<(), AccumulatorError> {
        self.write(report, out)
    }

    fn write_backtest(
        &self,
        summary: &PortfolioBacktestSummary,
        out: &mut dyn Write,
    ) -> Result<(), AccumulatorError> {
        self.write(summary, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::allocation::SentimentContext;
    use crate::domain::analysis::AssetAnalysis;
    use crate::domain::backtest::{BacktestConfig, BacktestOutcome};
    use serde_json::{json, Value};

    fn render_analysis(adapter: &JsonReportAdapter, report: &AnalysisReport) -> Value {
        let mut buf = Vec::new();
        adapter.write_analysis(report, &mut buf).unwrap();
        serde_json::from_slice(&buf).unwrap()
    }

    #[test]
    fn analysis_report_shape() {
        let report = AnalysisReport {
            budget_remaining: 300.0,
            fear_greed: SentimentContext::new(20.0, 55.0),
            analysis: vec![AssetAnalysis::insufficient("SOL")],
        };
        let value = render_analysis(&JsonReportAdapter::new(), &report);
        assert_eq!(
            value,
            json!({
                "budget_remaining": 300.0,
                "fear_greed": {"crypto": 20.0, "equity": 55.0},
                "analysis": [{"symbol": "SOL", "status": "Insufficient Data"}]
            })
        );
    }

    #[test]
    fn compact_output_is_one_line() {
        let report = AnalysisReport {
            budget_remaining: 0.0,
            fear_greed: SentimentContext::new(50.0, 50.0),
            analysis: Vec::new(),
        };
        let mut buf = Vec::new();
        JsonReportAdapter::compact()
            .write_analysis(&report, &mut buf)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn backtest_summary_shape() {
        let summary = PortfolioBacktestSummary::aggregate(
            &BacktestConfig::default(),
            SentimentContext::new(50.0, 50.0),
            vec![BacktestOutcome::empty("VOO")],
        );
        let mut buf = Vec::new();
        JsonReportAdapter::new()
            .write_backtest(&summary, &mut buf)
            .unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["lookahead_days"], 20);
        assert_eq!(value["history_days"], 720);
        assert_eq!(value["total_signals"], 0);
        assert_eq!(value["per_symbol"][0]["symbol"], "VOO");
        assert_eq!(value["per_symbol"][0]["signal_count"], 0);
    }
}

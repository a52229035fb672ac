//! Report output port trait.

use crate::domain::analysis::AnalysisReport;
use crate::domain::backtest::PortfolioBacktestSummary;
use crate::domain::error::AccumulatorError;
use std::io::Write;

pub trait ReportPort {
    fn write_analysis(
        &self,
        report: &AnalysisReport,
        out: &mut dyn Write,
    ) -> Result<(), AccumulatorError>;

    fn write_backtest(
        &self,
        summary: &PortfolioBacktestSummary,
        out: &mut dyn Write,
    ) -> Result<(), AccumulatorError>;
}

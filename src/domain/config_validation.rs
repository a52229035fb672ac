//! Configuration validation.
//!
//! Validates all config fields before any data is read. Builders in
//! [`crate::cli`] can then assume the values are in range.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::AccumulatorError;
use crate::ports::config_port::ConfigPort;

pub const LOG_FORMATS: &[&str] = &["text", "json"];

/// Sections used by every command.
pub fn validate_common_config(config: &dyn ConfigPort) -> Result<(), AccumulatorError> {
    validate_sentiment(config)?;
    validate_allocation(config)?;
    validate_scoring(config)?;
    validate_logging(config)?;
    Ok(())
}

/// Sections needed to load holdings and prices.
pub fn validate_sources_config(config: &dyn ConfigPort) -> Result<(), AccumulatorError> {
    validate_required_path(config, "portfolio", "holdings_file")?;
    validate_required_path(config, "market", "data_dir")?;
    validate_budget(config)?;
    validate_lookback(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), AccumulatorError> {
    let lookahead = config.get_int("backtest", "lookahead_days", 20);
    if lookahead < 1 {
        return Err(AccumulatorError::invalid(
            "backtest",
            "lookahead_days",
            "lookahead_days must be at least 1",
        ));
    }
    let min_history = config.get_int("backtest", "min_history", 220);
    let ema_period = config.get_int("scoring", "ema_period", 200);
    if min_history <= ema_period {
        return Err(AccumulatorError::invalid(
            "backtest",
            "min_history",
            "min_history must exceed scoring.ema_period",
        ));
    }
    let history_days = config.get_int("backtest", "history_days", 720);
    if history_days < min_history || history_days > i64::from(u32::MAX) {
        return Err(AccumulatorError::invalid(
            "backtest",
            "history_days",
            "history_days must be at least min_history",
        ));
    }
    Ok(())
}

/// Backtest settings after command-line overrides. `--lookahead` and `--days`
/// bypass the INI checks, so the same bounds are applied again here.
pub fn validate_backtest_overrides(bt: &BacktestConfig) -> Result<(), AccumulatorError> {
    if bt.lookahead_days == 0 {
        return Err(AccumulatorError::invalid(
            "backtest",
            "lookahead_days",
            "--lookahead must be at least 1",
        ));
    }
    if (bt.history_days as usize) < bt.min_history {
        return Err(AccumulatorError::invalid(
            "backtest",
            "history_days",
            format!("--days must be at least min_history ({})", bt.min_history),
        ));
    }
    Ok(())
}

fn validate_required_path(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), AccumulatorError> {
    match config.get_trimmed(section, key) {
        Some(_) => Ok(()),
        None => Err(AccumulatorError::missing(section, key)),
    }
}

fn validate_budget(config: &dyn ConfigPort) -> Result<(), AccumulatorError> {
    let value = config.get_double("portfolio", "budget", 300.0);
    if !value.is_finite() || value < 0.0 {
        return Err(AccumulatorError::invalid(
            "portfolio",
            "budget",
            "budget must be non-negative",
        ));
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), AccumulatorError> {
    let value = config.get_int("market", "lookback_days", 365);
    if value < 1 || value > i64::from(u32::MAX) {
        return Err(AccumulatorError::invalid(
            "market",
            "lookback_days",
            "lookback_days must be a positive number of days",
        ));
    }
    Ok(())
}

fn validate_sentiment(config: &dyn ConfigPort) -> Result<(), AccumulatorError> {
    for key in ["crypto_fear_greed", "equity_fear_greed"] {
        let value = config.get_double("sentiment", key, 50.0);
        if !(0.0..=100.0).contains(&value) {
            return Err(AccumulatorError::invalid(
                "sentiment",
                key,
                format!("{key} must be between 0 and 100"),
            ));
        }
    }
    Ok(())
}

fn validate_allocation(config: &dyn ConfigPort) -> Result<(), AccumulatorError> {
    for key in ["crypto_target_pct", "stock_total_target_pct"] {
        let default = if key == "crypto_target_pct" { 10.0 } else { 70.0 };
        let value = config.get_double("allocation", key, default);
        if !(0.0..=100.0).contains(&value) {
            return Err(AccumulatorError::invalid(
                "allocation",
                key,
                format!("{key} must be between 0 and 100"),
            ));
        }
    }
    if config.get_int("allocation", "stock_count", 0) < 0 {
        return Err(AccumulatorError::invalid(
            "allocation",
            "stock_count",
            "stock_count must be non-negative",
        ));
    }
    Ok(())
}

fn validate_scoring(config: &dyn ConfigPort) -> Result<(), AccumulatorError> {
    for (key, default) in [
        ("rsi_period", 14),
        ("ema_period", 200),
        ("volume_window", 20),
        ("support_lookback", 60),
    ] {
        if config.get_int("scoring", key, default) < 1 {
            return Err(AccumulatorError::invalid(
                "scoring",
                key,
                format!("{key} must be at least 1"),
            ));
        }
    }
    if config.get_double("scoring", "volume_shock_pct", 50.0) <= 0.0 {
        return Err(AccumulatorError::invalid(
            "scoring",
            "volume_shock_pct",
            "volume_shock_pct must be positive",
        ));
    }
    if config.get_double("scoring", "strong_buy_bonus", 100.0) < 0.0 {
        return Err(AccumulatorError::invalid(
            "scoring",
            "strong_buy_bonus",
            "strong_buy_bonus must be non-negative",
        ));
    }
    Ok(())
}

fn validate_logging(config: &dyn ConfigPort) -> Result<(), AccumulatorError> {
    let format = config
        .get_trimmed("logging", "format")
        .unwrap_or_else(|| "text".to_string())
        .to_lowercase();
    if !LOG_FORMATS.contains(&format.as_str()) {
        return Err(AccumulatorError::invalid(
            "logging",
            "format",
            "format must be text or json",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn invalid_key(err: AccumulatorError) -> String {
        match err {
            AccumulatorError::ConfigInvalid { key, .. } => key,
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn empty_config_uses_valid_defaults() {
        let cfg = config("");
        assert!(validate_common_config(&cfg).is_ok());
        assert!(validate_backtest_config(&cfg).is_ok());
    }

    #[test]
    fn sources_require_paths() {
        let cfg = config("[market]\ndata_dir = prices\n");
        let err = validate_sources_config(&cfg).unwrap_err();
        assert!(
            matches!(err, AccumulatorError::ConfigMissing { ref key, .. } if key == "holdings_file")
        );

        let cfg = config("[portfolio]\nholdings_file = h.csv\n");
        let err = validate_sources_config(&cfg).unwrap_err();
        assert!(matches!(err, AccumulatorError::ConfigMissing { ref key, .. } if key == "data_dir"));

        let cfg = config("[portfolio]\nholdings_file = h.csv\n[market]\ndata_dir = prices\n");
        assert!(validate_sources_config(&cfg).is_ok());
    }

    #[test]
    fn blank_path_counts_as_missing() {
        let cfg = config("[portfolio]\nholdings_file =   \n[market]\ndata_dir = p\n");
        assert!(matches!(
            validate_sources_config(&cfg).unwrap_err(),
            AccumulatorError::ConfigMissing { .. }
        ));
    }

    #[test]
    fn negative_budget_rejected() {
        let cfg = config("[portfolio]\nholdings_file = h.csv\nbudget = -1\n[market]\ndata_dir = p\n");
        assert_eq!(invalid_key(validate_sources_config(&cfg).unwrap_err()), "budget");
    }

    #[test]
    fn zero_lookback_rejected() {
        let cfg = config("[portfolio]\nholdings_file = h.csv\n[market]\ndata_dir = p\nlookback_days = 0\n");
        assert_eq!(invalid_key(validate_sources_config(&cfg).unwrap_err()), "lookback_days");
    }

    #[test]
    fn sentiment_out_of_range_rejected() {
        let cfg = config("[sentiment]\ncrypto_fear_greed = 101\n");
        assert_eq!(invalid_key(validate_common_config(&cfg).unwrap_err()), "crypto_fear_greed");

        let cfg = config("[sentiment]\nequity_fear_greed = -3\n");
        assert_eq!(invalid_key(validate_common_config(&cfg).unwrap_err()), "equity_fear_greed");
    }

    #[test]
    fn allocation_out_of_range_rejected() {
        let cfg = config("[allocation]\nstock_total_target_pct = 120\n");
        assert_eq!(
            invalid_key(validate_common_config(&cfg).unwrap_err()),
            "stock_total_target_pct"
        );

        let cfg = config("[allocation]\nstock_count = -2\n");
        assert_eq!(invalid_key(validate_common_config(&cfg).unwrap_err()), "stock_count");
    }

    #[test]
    fn scoring_periods_must_be_positive() {
        let cfg = config("[scoring]\nema_period = 0\n");
        assert_eq!(invalid_key(validate_common_config(&cfg).unwrap_err()), "ema_period");

        let cfg = config("[scoring]\nvolume_shock_pct = 0\n");
        assert_eq!(invalid_key(validate_common_config(&cfg).unwrap_err()), "volume_shock_pct");
    }

    #[test]
    fn unknown_log_format_rejected() {
        let cfg = config("[logging]\nformat = xml\n");
        assert_eq!(invalid_key(validate_common_config(&cfg).unwrap_err()), "format");

        let cfg = config("[logging]\nformat = JSON\n");
        assert!(validate_common_config(&cfg).is_ok());
    }

    #[test]
    fn backtest_lookahead_must_be_positive() {
        let cfg = config("[backtest]\nlookahead_days = 0\n");
        assert_eq!(invalid_key(validate_backtest_config(&cfg).unwrap_err()), "lookahead_days");
    }

    #[test]
    fn backtest_min_history_must_exceed_ema_window() {
        let cfg = config("[backtest]\nmin_history = 150\n");
        assert_eq!(invalid_key(validate_backtest_config(&cfg).unwrap_err()), "min_history");

        let cfg = config("[scoring]\nema_period = 50\n[backtest]\nmin_history = 60\nhistory_days = 90\n");
        assert!(validate_backtest_config(&cfg).is_ok());
    }

    #[test]
    fn backtest_history_days_at_least_min_history() {
        let cfg = config("[backtest]\nhistory_days = 100\n");
        assert_eq!(invalid_key(validate_backtest_config(&cfg).unwrap_err()), "history_days");
    }

    #[test]
    fn overrides_rejected_below_bounds() {
        let short_days = BacktestConfig {
            history_days: 100,
            ..BacktestConfig::default()
        };
        assert_eq!(invalid_key(validate_backtest_overrides(&short_days).unwrap_err()), "history_days");

        let no_lookahead = BacktestConfig {
            lookahead_days: 0,
            ..BacktestConfig::default()
        };
        assert_eq!(
            invalid_key(validate_backtest_overrides(&no_lookahead).unwrap_err()),
            "lookahead_days"
        );

        let exact = BacktestConfig {
            history_days: 220,
            ..BacktestConfig::default()
        };
        assert!(validate_backtest_overrides(&exact).is_ok());
    }
}

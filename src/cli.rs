//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::config_sentiment_adapter::ConfigSentimentAdapter;
use crate::adapters::csv_adapter::{read_price_file, CsvAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::portfolio_csv_adapter::PortfolioCsvAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::allocation::{parse_symbols, AllocationConfig, DEFAULT_CRYPTO_SYMBOLS};
use crate::domain::analysis::{analyze_portfolio, AnalysisReport};
use crate::domain::asset::Asset;
use crate::domain::backtest::{backtest, BacktestConfig, BacktestOutcome, PortfolioBacktestSummary};
use crate::domain::config_validation::{
    validate_backtest_config, validate_backtest_overrides, validate_common_config,
    validate_sources_config,
};
use crate::domain::decision::Decision;
use crate::domain::error::AccumulatorError;
use crate::domain::ohlcv::MarketSeries;
use crate::domain::scoring::{score, ScoreInput, ScoringParams};
use crate::logging::init_logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::portfolio_port::PortfolioPort;
use crate::ports::report_port::ReportPort;
use crate::ports::sentiment_port::SentimentPort;

pub const DEFAULT_BUDGET: f64 = 300.0;
pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

#[derive(Parser, Debug)]
#[command(
    name = "accumulator",
    about = "Score portfolio holdings for accumulation and backtest the scoring rule"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score every holding against current market data
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Json)]
        format: ReportFormat,
    },
    /// Walk-forward backtest of the scoring rule over every holding
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Observations between a signal and the close it is judged against
        #[arg(long)]
        lookahead: Option<usize>,
        /// Calendar days of history to replay
        #[arg(long)]
        days: Option<u32>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Json)]
        format: ReportFormat,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Score a single price file
    ScoreCsv {
        #[arg(long)]
        prices: PathBuf,
        /// Scoring parameters; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Live price; defaults to the last close
        #[arg(long)]
        price: Option<f64>,
        #[arg(long, default_value_t = 0.0)]
        avg_cost: f64,
        /// Current allocation as a fraction
        #[arg(long, default_value_t = 0.0)]
        current_alloc: f64,
        /// Target allocation as a fraction
        #[arg(long, default_value_t = 0.0)]
        target_alloc: f64,
        #[arg(long, default_value_t = 50.0)]
        fear_greed: f64,
        #[arg(long, default_value_t = DEFAULT_BUDGET)]
        budget: f64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            config,
            output,
            format,
        } => run_analyze(&config, output.as_deref(), format),
        Command::Backtest {
            config,
            lookahead,
            days,
            output,
            format,
        } => run_backtest(&config, lookahead, days, output.as_deref(), format),
        Command::Validate { config } => run_validate(&config),
        Command::ScoreCsv {
            prices,
            config,
            price,
            avg_cost,
            current_alloc,
            target_alloc,
            fear_greed,
            budget,
            output,
        } => {
            let asset = Asset::new(symbol_from_path(&prices))
                .with_avg_cost(avg_cost)
                .with_allocation(current_alloc, target_alloc);
            let quote = ScoreCsvQuote {
                price,
                fear_greed,
                budget,
            };
            run_score_csv(&prices, config.as_deref(), &asset, &quote, output.as_deref())
        }
    }
}

fn fail(err: AccumulatorError) -> ExitCode {
    tracing::error!(error = %err, "command failed");
    eprintln!("error: {err}");
    ExitCode::from(&err)
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, AccumulatorError> {
    FileConfigAdapter::from_file(path).map_err(|e| AccumulatorError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Load and validate the config file, then start logging from its
/// `[logging]` section.
fn prepare(path: &Path) -> Result<FileConfigAdapter, AccumulatorError> {
    let config = load_config(path)?;
    validate_common_config(&config)?;
    start_logging(&config)?;
    tracing::info!(config = %path.display(), "configuration loaded");
    Ok(config)
}

fn start_logging(config: &dyn ConfigPort) -> Result<(), AccumulatorError> {
    let level = config
        .get_trimmed("logging", "level")
        .unwrap_or_else(|| "info".to_string());
    let format = config
        .get_trimmed("logging", "format")
        .unwrap_or_else(|| "text".to_string());
    init_logging(&level, &format)
}

pub fn build_scoring_params(config: &dyn ConfigPort) -> ScoringParams {
    let defaults = ScoringParams::default();
    let period = |key: &str, default: usize| {
        usize::try_from(config.get_int("scoring", key, default as i64)).unwrap_or(default)
    };
    ScoringParams {
        rsi_period: period("rsi_period", defaults.rsi_period),
        ema_period: period("ema_period", defaults.ema_period),
        volume_window: period("volume_window", defaults.volume_window),
        volume_shock_pct: config.get_double("scoring", "volume_shock_pct", defaults.volume_shock_pct),
        support_lookback: period("support_lookback", defaults.support_lookback),
        strong_buy_bonus: config.get_double("scoring", "strong_buy_bonus", defaults.strong_buy_bonus),
    }
}

/// Backtest settings from config, with command-line overrides applied.
pub fn build_backtest_config(
    config: &dyn ConfigPort,
    lookahead: Option<usize>,
    days: Option<u32>,
) -> BacktestConfig {
    let defaults = BacktestConfig::default();
    let lookahead_days = lookahead.unwrap_or_else(|| {
        usize::try_from(config.get_int("backtest", "lookahead_days", defaults.lookahead_days as i64))
            .unwrap_or(defaults.lookahead_days)
    });
    let history_days = days.unwrap_or_else(|| {
        u32::try_from(config.get_int("backtest", "history_days", i64::from(defaults.history_days)))
            .unwrap_or(defaults.history_days)
    });
    let min_history =
        usize::try_from(config.get_int("backtest", "min_history", defaults.min_history as i64))
            .unwrap_or(defaults.min_history);

    BacktestConfig {
        lookahead_days,
        history_days,
        min_history,
    }
}

pub fn build_allocation_config(config: &dyn ConfigPort) -> AllocationConfig {
    let defaults = AllocationConfig::default();
    let crypto_symbols = match config.get_string("allocation", "crypto_symbols") {
        Some(list) => parse_symbols(&list),
        None => parse_symbols(&DEFAULT_CRYPTO_SYMBOLS.join(",")),
    };
    AllocationConfig {
        crypto_symbols,
        crypto_target_pct: config.get_double("allocation", "crypto_target_pct", defaults.crypto_target_pct),
        stock_total_target_pct: config.get_double(
            "allocation",
            "stock_total_target_pct",
            defaults.stock_total_target_pct,
        ),
        stock_count: usize::try_from(config.get_int("allocation", "stock_count", 0)).unwrap_or(0),
    }
}

fn lookback_days(config: &dyn ConfigPort) -> u32 {
    u32::try_from(config.get_int("market", "lookback_days", i64::from(DEFAULT_LOOKBACK_DAYS)))
        .unwrap_or(DEFAULT_LOOKBACK_DAYS)
}

/// The CSV-backed holdings source described by `[portfolio]`.
pub fn build_portfolio_adapter(
    config: &dyn ConfigPort,
    config_dir: &Path,
    allocation: AllocationConfig,
) -> Result<PortfolioCsvAdapter, AccumulatorError> {
    let holdings = config
        .get_trimmed("portfolio", "holdings_file")
        .ok_or_else(|| AccumulatorError::missing("portfolio", "holdings_file"))?;
    let mut adapter = PortfolioCsvAdapter::new(config_dir.join(holdings), allocation);
    if let Some(budget_file) = config.get_trimmed("portfolio", "budget_file") {
        adapter = adapter.with_budget_file(config_dir.join(budget_file));
    }
    Ok(adapter)
}

pub fn build_data_adapter(
    config: &dyn ConfigPort,
    config_dir: &Path,
) -> Result<CsvAdapter, AccumulatorError> {
    let data_dir = config
        .get_trimmed("market", "data_dir")
        .ok_or_else(|| AccumulatorError::missing("market", "data_dir"))?;
    Ok(CsvAdapter::new(config_dir.join(data_dir)))
}

/// Remaining budget from the holdings source, else the configured fallback.
/// Negative values are treated as nothing left to spend.
pub fn resolve_budget(
    portfolio: &dyn PortfolioPort,
    fallback: f64,
) -> Result<f64, AccumulatorError> {
    let budget = portfolio.remaining_budget()?.unwrap_or(fallback);
    Ok(if budget.is_finite() { budget.max(0.0) } else { fallback })
}

/// Load bars for every holding. A symbol whose data cannot be loaded gets an
/// empty series and is reported as insufficient downstream.
pub fn load_market_series(
    data: &dyn DataPort,
    holdings: Vec<Asset>,
    lookback_days: u32,
) -> Vec<(Asset, MarketSeries)> {
    holdings
        .into_iter()
        .map(|asset| {
            let series = match data.fetch_bars(&asset.symbol, lookback_days) {
                Ok(bars) => MarketSeries::from_bars(&bars),
                Err(e) => {
                    tracing::warn!(symbol = %asset.symbol, error = %e, "no market data");
                    MarketSeries::default()
                }
            };
            (asset, series)
        })
        .collect()
}

pub struct AnalysisSettings {
    pub allocation: AllocationConfig,
    pub params: ScoringParams,
    pub lookback_days: u32,
    pub default_budget: f64,
}

pub fn run_analysis_pipeline(
    portfolio: &dyn PortfolioPort,
    data: &dyn DataPort,
    sentiment: &dyn SentimentPort,
    settings: &AnalysisSettings,
) -> Result<AnalysisReport, AccumulatorError> {
    let holdings = portfolio.holdings()?;
    let budget = resolve_budget(portfolio, settings.default_budget)?;
    let context = sentiment.context()?;
    let allocation = settings
        .allocation
        .clone()
        .with_stock_count_from(holdings.iter().map(|a| a.symbol.as_str()));
    tracing::info!(
        holdings = holdings.len(),
        budget,
        crypto_fear_greed = context.crypto,
        equity_fear_greed = context.equity,
        "analyzing portfolio"
    );

    let series = load_market_series(data, holdings, settings.lookback_days);
    let report = analyze_portfolio(&series, context, &allocation, budget, &settings.params);

    let actionable = report
        .analysis
        .iter()
        .filter_map(|a| a.decision())
        .filter(|d| d.is_actionable())
        .count();
    tracing::info!(
        analyzed = report.analysis.len(),
        actionable,
        "analysis complete"
    );
    Ok(report)
}

pub fn run_backtest_pipeline(
    portfolio: &dyn PortfolioPort,
    data: &dyn DataPort,
    sentiment: &dyn SentimentPort,
    allocation: &AllocationConfig,
    bt_config: &BacktestConfig,
    params: &ScoringParams,
) -> Result<PortfolioBacktestSummary, AccumulatorError> {
    let holdings = portfolio.holdings()?;
    let context = sentiment.context()?;
    tracing::info!(
        holdings = holdings.len(),
        lookahead_days = bt_config.lookahead_days,
        history_days = bt_config.history_days,
        "running backtest"
    );

    let per_symbol = holdings
        .iter()
        .map(|asset| match data.fetch_bars(&asset.symbol, bt_config.history_days) {
            Ok(bars) => {
                let fear_greed = context.for_symbol(&asset.symbol, allocation);
                backtest(asset, &bars, fear_greed, bt_config, params)
            }
            Err(e) => {
                tracing::warn!(symbol = %asset.symbol, error = %e, "skipping backtest");
                BacktestOutcome::empty(&asset.symbol)
            }
        })
        .collect();

    let summary = PortfolioBacktestSummary::aggregate(bt_config, context, per_symbol);
    tracing::info!(
        total_signals = summary.total_signals,
        avg_hit_rate_pct = summary.avg_hit_rate_pct,
        "backtest complete"
    );
    Ok(summary)
}

fn report_adapter(format: ReportFormat) -> Box<dyn ReportPort> {
    match format {
        ReportFormat::Json => Box::new(JsonReportAdapter::new()),
        ReportFormat::Text => Box::new(TextReportAdapter::new()),
    }
}

/// Write a report to `output`, or stdout when absent.
fn write_output(
    output: Option<&Path>,
    render: impl FnOnce(&mut dyn Write) -> Result<(), AccumulatorError>,
) -> Result<(), AccumulatorError> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            render(&mut writer)?;
            writer.flush()?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            render(&mut lock)?;
            lock.flush()?;
        }
    }
    Ok(())
}

fn config_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

fn run_analyze(config_path: &Path, output: Option<&Path>, format: ReportFormat) -> ExitCode {
    let result = (|| {
        let config = prepare(config_path)?;
        validate_sources_config(&config)?;

        let dir = config_dir(config_path);
        let allocation = build_allocation_config(&config);
        let portfolio = build_portfolio_adapter(&config, dir, allocation.clone())?;
        let data = build_data_adapter(&config, dir)?;
        let sentiment = ConfigSentimentAdapter::from_config(&config);
        let settings = AnalysisSettings {
            allocation,
            params: build_scoring_params(&config),
            lookback_days: lookback_days(&config),
            default_budget: config.get_double("portfolio", "budget", DEFAULT_BUDGET),
        };

        let report = run_analysis_pipeline(&portfolio, &data, &sentiment, &settings)?;
        let reporter = report_adapter(format);
        write_output(output, |w| reporter.write_analysis(&report, w))
    })();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

fn run_backtest(
    config_path: &Path,
    lookahead: Option<usize>,
    days: Option<u32>,
    output: Option<&Path>,
    format: ReportFormat,
) -> ExitCode {
    let result = (|| {
        let config = prepare(config_path)?;
        validate_sources_config(&config)?;
        validate_backtest_config(&config)?;
        let bt_config = build_backtest_config(&config, lookahead, days);
        validate_backtest_overrides(&bt_config)?;

        let dir = config_dir(config_path);
        let allocation = build_allocation_config(&config);
        let portfolio = build_portfolio_adapter(&config, dir, allocation.clone())?;
        let data = build_data_adapter(&config, dir)?;
        let sentiment = ConfigSentimentAdapter::from_config(&config);
        let params = build_scoring_params(&config);

        let summary = run_backtest_pipeline(
            &portfolio,
            &data,
            &sentiment,
            &allocation,
            &bt_config,
            &params,
        )?;
        let reporter = report_adapter(format);
        write_output(output, |w| reporter.write_backtest(&summary, w))
    })();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let result = load_config(config_path).and_then(|config| {
        validate_common_config(&config)?;
        validate_sources_config(&config)?;
        validate_backtest_config(&config)?;
        Ok(config)
    });

    match result {
        Ok(config) => {
            let params = build_scoring_params(&config);
            let bt = build_backtest_config(&config, None, None);
            let allocation = build_allocation_config(&config);
            eprintln!(
                "  scoring:    RSI({}) EMA({}) volume window {}",
                params.rsi_period, params.ema_period, params.volume_window
            );
            eprintln!(
                "  backtest:   {} day lookahead, {} days history, {} minimum observations",
                bt.lookahead_days, bt.history_days, bt.min_history
            );
            eprintln!(
                "  allocation: crypto {:?} at {}%, equities {}% total",
                allocation.crypto_symbols, allocation.crypto_target_pct, allocation.stock_total_target_pct
            );
            eprintln!("\nConfiguration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn symbol_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.trim_end_matches("-USD").to_uppercase())
        .unwrap_or_default()
}

/// Market inputs for scoring a single price file.
pub struct ScoreCsvQuote {
    /// Live price; the last close when `None`.
    pub price: Option<f64>,
    pub fear_greed: f64,
    pub budget: f64,
}

/// Score the last bar of one price file. Volumes in the file feed the
/// volume-shock metric.
pub fn score_price_file(
    prices: &Path,
    asset: &Asset,
    quote: &ScoreCsvQuote,
    params: &ScoringParams,
) -> Result<Decision, AccumulatorError> {
    let bars = read_price_file(prices, &asset.symbol)?;
    let mut series = MarketSeries::from_bars(&bars);
    if let Some(p) = quote.price {
        series = series.with_quote(p);
    }
    let input = ScoreInput {
        price: series.latest_price,
        closes: &series.closes,
        volumes: Some(series.volumes.as_slice()),
        avg_cost: asset.avg_cost,
        current_alloc: asset.current_alloc,
        target_alloc: asset.target_alloc,
        fear_greed: quote.fear_greed,
        budget: quote.budget,
    };
    let decision = score(&input, params);
    tracing::debug!(
        symbol = %asset.symbol,
        closes = series.len(),
        score = decision.score,
        "scored price file"
    );
    Ok(decision)
}

fn run_score_csv(
    prices: &Path,
    config_path: Option<&Path>,
    asset: &Asset,
    quote: &ScoreCsvQuote,
    output: Option<&Path>,
) -> ExitCode {
    let result = (|| {
        let params = match config_path {
            Some(path) => build_scoring_params(&prepare(path)?),
            None => ScoringParams::default(),
        };
        let decision = score_price_file(prices, asset, quote, &params)?;
        write_output(output, |w| {
            serde_json::to_writer_pretty(&mut *w, &decision)?;
            writeln!(w)?;
            Ok(())
        })
    })();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

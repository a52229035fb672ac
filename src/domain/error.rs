//! Domain error types.
//!
//! Scoring and backtesting never fail: data shortfalls are reported through
//! [`DecisionStatus`](crate::domain::decision::DecisionStatus) and absent
//! metrics. The errors below belong to configuration, data sources and output.

/// Top-level error type for accumulator.
#[derive(Debug, thiserror::Error)]
pub enum AccumulatorError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("portfolio source error: {reason}")]
    Portfolio { reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AccumulatorError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        AccumulatorError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(section: &str, key: &str) -> Self {
        AccumulatorError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<&AccumulatorError> for std::process::ExitCode {
    fn from(err: &AccumulatorError) -> Self {
        let code: u8 = match err {
            AccumulatorError::Io(_) => 1,
            AccumulatorError::ConfigParse { .. }
            | AccumulatorError::ConfigMissing { .. }
            | AccumulatorError::ConfigInvalid { .. } => 2,
            AccumulatorError::DataSource { .. }
            | AccumulatorError::Portfolio { .. }
            | AccumulatorError::Csv(_) => 3,
            AccumulatorError::NoData { .. } => 5,
            AccumulatorError::Json(_) => 6,
        };
        std::process::ExitCode::from(code)
    }
}

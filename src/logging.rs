//! Tracing subscriber setup.
//!
//! Logs go to stderr so report output on stdout stays machine readable.

use crate::domain::error::AccumulatorError;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured filter directive.
pub const LOG_ENV: &str = "ACCUMULATOR_LOG";

pub fn log_filter(level: &str) -> Result<EnvFilter, AccumulatorError> {
    let directive = std::env::var(LOG_ENV).unwrap_or_else(|_| level.trim().to_string());
    EnvFilter::try_new(&directive)
        .map_err(|e| AccumulatorError::invalid("logging", "level", format!("{directive}: {e}")))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(level: &str, format: &str) -> Result<(), AccumulatorError> {
    let filter = log_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if format.trim().eq_ignore_ascii_case("json") {
        builder.json().try_init()
    } else {
        builder.with_target(false).try_init()
    };
    if let Err(e) = installed {
        // the subscriber already in place keeps receiving events
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
    Ok(())
}

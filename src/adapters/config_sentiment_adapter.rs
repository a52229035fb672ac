//! Fear/greed readings taken from the `[sentiment]` config section.

use crate::domain::allocation::AssetClass;
use crate::domain::error::AccumulatorError;
use crate::ports::config_port::ConfigPort;
use crate::ports::sentiment_port::SentimentPort;

/// Neutral reading used when a value is not configured.
pub const NEUTRAL_FEAR_GREED: f64 = 50.0;

pub struct ConfigSentimentAdapter {
    crypto: f64,
    equity: f64,
}

impl ConfigSentimentAdapter {
    pub fn new(crypto: f64, equity: f64) -> Self {
        Self { crypto, equity }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Self {
        Self::new(
            config.get_double("sentiment", "crypto_fear_greed", NEUTRAL_FEAR_GREED),
            config.get_double("sentiment", "equity_fear_greed", NEUTRAL_FEAR_GREED),
        )
    }
}

impl SentimentPort for ConfigSentimentAdapter {
    fn fear_greed(&self, class: AssetClass) -> Result<f64, AccumulatorError> {
        let value = match class {
            AssetClass::Crypto => self.crypto,
            AssetClass::Equity => self.equity,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(AccumulatorError::DataSource {
                reason: format!("fear/greed reading for {class:?} is not a number"),
            })
        }
    }
}

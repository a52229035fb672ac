//! Fear/greed sentiment port trait.

use crate::domain::allocation::{AssetClass, SentimentContext};
use crate::domain::error::AccumulatorError;

pub trait SentimentPort {
    /// Current fear/greed reading for an asset class, in `[0, 100]`.
    fn fear_greed(&self, class: AssetClass) -> Result<f64, AccumulatorError>;

    fn context(&self) -> Result<SentimentContext, AccumulatorError> {
        Ok(SentimentContext::new(
            self.fear_greed(AssetClass::Crypto)?,
            self.fear_greed(AssetClass::Equity)?,
        ))
    }
}

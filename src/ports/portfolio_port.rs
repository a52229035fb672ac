//! Holdings and budget source port trait.

use crate::domain::asset::Asset;
use crate::domain::error::AccumulatorError;

pub trait PortfolioPort {
    fn holdings(&self) -> Result<Vec<Asset>, AccumulatorError>;

    /// Remaining budget, or `None` when the source has no record of one.
    fn remaining_budget(&self) -> Result<Option<f64>, AccumulatorError>;
}

//! Port traits implemented by the adapters.

pub mod config_port;
pub mod data_port;
pub mod portfolio_port;
pub mod report_port;
pub mod sentiment_port;

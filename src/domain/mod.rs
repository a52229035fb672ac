//! Core domain types and logic.

pub mod allocation;
pub mod analysis;
pub mod asset;
pub mod backtest;
pub mod config_validation;
pub mod decision;
pub mod error;
pub mod indicator;
pub mod indicator_helpers;
pub mod ohlcv;
pub mod rounding;
pub mod scoring;

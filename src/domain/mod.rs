//! Core domain types and logic.

pub mod alert;
pub mod combiner;
pub mod config;
pub mod config_validation;
pub mod decision;
pub mod engine;
pub mod error;
pub mod indicator;
pub mod ohlcv;
pub mod position;
pub mod price_series;
pub mod replay;
pub mod signal;
pub mod snapshot;
pub mod strategy;

#[cfg(test)]
pub(crate) mod test_support;

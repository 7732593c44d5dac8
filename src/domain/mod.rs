//! Core domain types and computations.

pub mod ohlcv;
pub mod query;
pub mod indicator;
pub mod metrics;
pub mod summary;
pub mod histogram;
pub mod config_validation;
pub mod error;

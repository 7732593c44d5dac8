//! Rolling-window indicator primitives.
//!
//! Every indicator produces one `Option<f64>` per input row. `None` marks a
//! row without enough history; it is never replaced by a numeric sentinel.
//!
//! - `IndicatorType`: indicator identity + parameters (also the column label)
//! - `IndicatorSeries`: a column of optional values for one indicator

pub mod returns;
pub mod sma;
pub mod stddev;

use std::fmt;

pub use returns::calculate_daily_returns;
pub use sma::calculate_sma;
pub use stddev::{StdDevKind, calculate_rolling_stddev, stddev};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    DailyReturn,
    Volatility(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::DailyReturn => write!(f, "RETURN"),
            IndicatorType::Volatility(period) => write!(f, "VOLATILITY({})", period),
        }
    }
}

//! Daily OHLCV observations and the validated price series built from them.

use chrono::NaiveDate;

use crate::domain::error::StockdashError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Ordered, date-indexed observations for one ticker.
///
/// Construction through [`PriceSeries::new`] guarantees strictly increasing
/// dates and strictly positive, finite prices.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, StockdashError> {
        validate_bars(&bars)?;
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    /// Sorts bars by date before validating. Duplicate dates are still rejected.
    pub fn from_unordered(
        symbol: impl Into<String>,
        mut bars: Vec<OhlcvBar>,
    ) -> Result<Self, StockdashError> {
        bars.sort_by_key(|b| b.date);
        Self::new(symbol, bars)
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

pub fn validate_bars(bars: &[OhlcvBar]) -> Result<(), StockdashError> {
    for (i, bar) in bars.iter().enumerate() {
        for (name, value) in [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(StockdashError::malformed(
                    i,
                    format!("{} must be positive, got {}", name, value),
                ));
            }
        }

        if i > 0 {
            let prev = bars[i - 1].date;
            if bar.date == prev {
                return Err(StockdashError::malformed(
                    i,
                    format!("duplicate date {}", bar.date),
                ));
            }
            if bar.date < prev {
                return Err(StockdashError::malformed(
                    i,
                    format!("date {} is before previous date {}", bar.date, prev),
                ));
            }
        }
    }
    Ok(())
}

//! Fetch requests: which symbol over which date range.

use chrono::{Local, Months, NaiveDate};

use crate::domain::error::StockdashError;

pub const DEFAULT_SYMBOL: &str = "AAPL";

/// A validated (symbol, start, end) request. Also the fetch cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceQuery {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PriceQuery {
    /// Normalizes the symbol and rejects ranges whose end precedes the start.
    pub fn new(symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Self, StockdashError> {
        let symbol = normalize_symbol(symbol)?;
        if end < start {
            return Err(StockdashError::DateRangeInvalid { start, end });
        }
        Ok(Self { symbol, start, end })
    }

    /// One year back from `today`, inclusive of both ends.
    pub fn trailing_year(symbol: &str, today: NaiveDate) -> Result<Self, StockdashError> {
        let start = today
            .checked_sub_months(Months::new(12))
            .unwrap_or(NaiveDate::MIN);
        Self::new(symbol, start, today)
    }

    pub fn default_for_today(symbol: &str) -> Result<Self, StockdashError> {
        Self::trailing_year(symbol, Local::now().date_naive())
    }

    /// Builds a query from optional user-supplied fields, filling gaps from the defaults.
    pub fn from_parts(
        symbol: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
        default_symbol: &str,
        today: NaiveDate,
    ) -> Result<Self, StockdashError> {
        let defaults = Self::trailing_year(default_symbol, today)?;

        let symbol = match symbol.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => s,
            None => defaults.symbol.as_str(),
        };
        let start = match start.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => parse_date(s, "start date")?,
            None => defaults.start,
        };
        let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => parse_date(s, "end date")?,
            None => defaults.end,
        };

        Self::new(symbol, start, end)
    }
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, StockdashError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        StockdashError::invalid_input(field, format!("'{}' is not a YYYY-MM-DD date", value))
    })
}

fn normalize_symbol(symbol: &str) -> Result<String, StockdashError> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(StockdashError::invalid_input("symbol", "symbol is empty"));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(StockdashError::invalid_input(
            "symbol",
            format!("'{}' contains unsupported characters", symbol),
        ));
    }
    Ok(symbol)
}

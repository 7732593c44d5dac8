//! Yahoo Finance chart API adapter.
//!
//! Fetches daily bars from `/v8/finance/chart/{symbol}`. Rows where any of
//! open/high/low/close is null are dropped; a null volume reads as 0.

use std::time::Duration;

use chrono::{DateTime, Days, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::error::StockdashError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::query::PriceQuery;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = concat!("stockdash/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StockdashError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StockdashError::Provider {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockdashError> {
        let base_url = config
            .get_string("data", "yahoo_base_url")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = config.get_int("data", "timeout_secs", 10).max(1) as u64;
        Self::new(base_url, Duration::from_secs(timeout))
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }
}

/// Unix seconds at midnight UTC of `date`.
fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0)
}

/// Decodes a chart API body into bars within the query range.
pub fn parse_chart_response(body: &str, query: &PriceQuery) -> Result<Vec<OhlcvBar>, StockdashError> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| StockdashError::Provider {
            reason: format!("invalid chart response: {}", e),
        })?;

    if let Some(err) = envelope.chart.error {
        debug!(
            symbol = %query.symbol,
            code = %err.code,
            description = err.description.as_deref().unwrap_or(""),
            "chart API reported an error"
        );
        return Err(StockdashError::InvalidSymbol {
            symbol: query.symbol.clone(),
        });
    }

    let result = match envelope.chart.result.and_then(|r| r.into_iter().next()) {
        Some(r) => r,
        None => {
            return Err(StockdashError::InvalidSymbol {
                symbol: query.symbol.clone(),
            });
        }
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars: Vec<OhlcvBar> = Vec::with_capacity(timestamps.len());
    let mut skipped = 0usize;

    for (i, ts) in timestamps.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
            skipped += 1;
            continue;
        };
        if date < query.start || date > query.end {
            continue;
        }

        let value = |col: &[Option<f64>]| col.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close)) = (
            value(quote.open.as_slice()),
            value(quote.high.as_slice()),
            value(quote.low.as_slice()),
            value(quote.close.as_slice()),
        ) else {
            skipped += 1;
            continue;
        };
        let volume = quote.volume.get(i).copied().flatten().unwrap_or(0);

        let bar = OhlcvBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        };

        // The live session can repeat the last date; keep the later row.
        match bars.last_mut() {
            Some(last) if last.date == date => *last = bar,
            _ => bars.push(bar),
        }
    }

    if skipped > 0 {
        warn!(symbol = %query.symbol, skipped, "dropped incomplete chart rows");
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

impl DataPort for YahooAdapter {
    fn fetch_daily(&self, query: &PriceQuery) -> Result<Vec<OhlcvBar>, StockdashError> {
        let period1 = unix_midnight(query.start);
        let after_end = query
            .end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| StockdashError::invalid_input("end", "date is out of range"))?;
        let period2 = unix_midnight(after_end);

        info!(
            symbol = %query.symbol,
            start = %query.start,
            end = %query.end,
            "fetching daily bars from Yahoo"
        );

        let response = self
            .client
            .get(self.chart_url(&query.symbol))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .map_err(|e| StockdashError::Provider {
                reason: format!("request failed: {}", e),
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| StockdashError::Provider {
            reason: format!("failed to read response body: {}", e),
        })?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StockdashError::InvalidSymbol {
                symbol: query.symbol.clone(),
            });
        }
        if !status.is_success() {
            return Err(StockdashError::Provider {
                reason: format!("chart API returned status {}", status),
            });
        }

        let bars = parse_chart_response(&body, query)?;
        debug!(symbol = %query.symbol, rows = bars.len(), "decoded chart response");
        Ok(bars)
    }

    fn name(&self) -> &str {
        "yahoo"
    }

    fn source(&self) -> &str {
        "Yahoo Finance"
    }
}

//! CSV directory data adapter.
//!
//! One file per symbol, `<dir>/<SYMBOL>.csv`, with the header
//! `date,open,high,low,close,volume`.

use crate::domain::error::StockdashError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::query::PriceQuery;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn field<'a>(record: &'a csv::StringRecord, idx: usize, name: &str) -> Result<&'a str, StockdashError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| StockdashError::Provider {
            reason: format!("missing {} column", name),
        })
}

fn parse_price(record: &csv::StringRecord, idx: usize, name: &str) -> Result<f64, StockdashError> {
    field(record, idx, name)?
        .parse()
        .map_err(|e| StockdashError::Provider {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_daily(&self, query: &PriceQuery) -> Result<Vec<OhlcvBar>, StockdashError> {
        let path = self.csv_path(&query.symbol);
        if !path.exists() {
            return Err(StockdashError::InvalidSymbol {
                symbol: query.symbol.clone(),
            });
        }

        let content = fs::read_to_string(&path).map_err(|e| StockdashError::Provider {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| StockdashError::Provider {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = field(&record, 0, "date")?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                StockdashError::Provider {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            if date < query.start || date > query.end {
                continue;
            }

            let volume: u64 = field(&record, 5, "volume")?
                .parse()
                .map_err(|e| StockdashError::Provider {
                    reason: format!("invalid volume value: {}", e),
                })?;

            bars.push(OhlcvBar {
                date,
                open: parse_price(&record, 1, "open")?,
                high: parse_price(&record, 2, "high")?,
                low: parse_price(&record, 3, "low")?,
                close: parse_price(&record, 4, "close")?,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        debug!(
            symbol = %query.symbol,
            rows = bars.len(),
            path = %path.display(),
            "loaded CSV bars"
        );
        Ok(bars)
    }

    fn name(&self) -> &str {
        "csv"
    }

    fn source(&self) -> &str {
        "local CSV files"
    }
}

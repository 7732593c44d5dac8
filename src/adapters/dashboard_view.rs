//! Display-ready view of an augmented series.
//!
//! Templates only ever see strings; every number is formatted here and
//! missing values render as "—".

use crate::adapters::chart_svg;
use crate::domain::error::StockdashError;
use crate::domain::histogram::{DEFAULT_BINS, Histogram};
use crate::domain::metrics::AugmentedSeries;
use crate::domain::query::PriceQuery;
use crate::domain::summary::describe;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_TAIL_ROWS: usize = 5;
pub const MISSING: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub histogram_bins: usize,
    pub tail_rows: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_BINS,
            tail_rows: DEFAULT_TAIL_ROWS,
        }
    }
}

impl ViewOptions {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockdashError> {
        let bins = config.get_int("dashboard", "histogram_bins", DEFAULT_BINS as i64);
        if bins < 1 {
            return Err(StockdashError::ConfigInvalid {
                section: "dashboard".into(),
                key: "histogram_bins".into(),
                reason: format!("must be at least 1, got {}", bins),
            });
        }
        let tail = config.get_int("dashboard", "tail_rows", DEFAULT_TAIL_ROWS as i64);
        if tail < 0 {
            return Err(StockdashError::ConfigInvalid {
                section: "dashboard".into(),
                key: "tail_rows".into(),
                reason: format!("must not be negative, got {}", tail),
            });
        }
        Ok(Self {
            histogram_bins: bins as usize,
            tail_rows: tail as usize,
        })
    }
}

pub fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", precision, v),
        _ => MISSING.to_string(),
    }
}

pub struct SummaryRow {
    pub name: String,
    pub count: String,
    pub mean: String,
    pub std: String,
    pub min: String,
    pub q25: String,
    pub median: String,
    pub q75: String,
    pub max: String,
}

pub struct TailRow {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    pub sma_short: String,
    pub sma_long: String,
    pub daily_return: String,
    pub volatility: String,
}

pub struct DashboardView {
    pub symbol: String,
    pub start: String,
    pub end: String,
    pub has_data: bool,
    pub empty_message: String,
    pub sma_short_label: String,
    pub sma_long_label: String,
    pub price_svg: String,
    pub returns_svg: String,
    pub volatility_svg: String,
    pub summary: Vec<SummaryRow>,
    pub tail: Vec<TailRow>,
}

impl DashboardView {
    /// Empty state for a query that produced no rows.
    pub fn empty(query: &PriceQuery) -> Self {
        Self {
            symbol: query.symbol.clone(),
            start: query.start.to_string(),
            end: query.end.to_string(),
            has_data: false,
            empty_message: format!(
                "No data found for {} between {} and {}",
                query.symbol, query.start, query.end
            ),
            sma_short_label: String::new(),
            sma_long_label: String::new(),
            price_svg: String::new(),
            returns_svg: String::new(),
            volatility_svg: String::new(),
            summary: Vec::new(),
            tail: Vec::new(),
        }
    }

    pub fn build(query: &PriceQuery, augmented: &AugmentedSeries<'_>, options: &ViewOptions) -> Self {
        if augmented.is_empty() {
            return Self::empty(query);
        }

        let histogram = Histogram::from_values(&augmented.daily_returns(), options.histogram_bins);

        let summary = describe(augmented)
            .into_iter()
            .map(|c| {
                let precision = if c.name == "Volume" { 0 } else { 4 };
                SummaryRow {
                    count: c.count.to_string(),
                    mean: fmt_opt(c.mean, precision),
                    std: fmt_opt(c.std, precision),
                    min: fmt_opt(c.min, precision),
                    q25: fmt_opt(c.q25, precision),
                    median: fmt_opt(c.median, precision),
                    q75: fmt_opt(c.q75, precision),
                    max: fmt_opt(c.max, precision),
                    name: c.name,
                }
            })
            .collect();

        let tail = augmented
            .tail(options.tail_rows)
            .into_iter()
            .map(|(bar, m)| TailRow {
                date: bar.date.to_string(),
                open: format!("{:.2}", bar.open),
                high: format!("{:.2}", bar.high),
                low: format!("{:.2}", bar.low),
                close: format!("{:.2}", bar.close),
                volume: bar.volume.to_string(),
                sma_short: fmt_opt(m.sma_short, 2),
                sma_long: fmt_opt(m.sma_long, 2),
                daily_return: fmt_opt(m.daily_return, 4),
                volatility: fmt_opt(m.volatility, 4),
            })
            .collect();

        Self {
            symbol: query.symbol.clone(),
            start: query.start.to_string(),
            end: query.end.to_string(),
            has_data: true,
            empty_message: String::new(),
            sma_short_label: format!("SMA {}", augmented.config.sma_short),
            sma_long_label: format!("SMA {}", augmented.config.sma_long),
            price_svg: chart_svg::price_chart_svg(augmented),
            returns_svg: chart_svg::returns_histogram_svg(&histogram),
            volatility_svg: chart_svg::volatility_chart_svg(augmented),
            summary,
            tail,
        }
    }
}

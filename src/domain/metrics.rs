//! Derived-metrics pipeline.
//!
//! Augments a validated [`PriceSeries`] with two trailing simple moving
//! averages of close, the daily return, and the rolling volatility of the
//! daily return. Every derived value is `Option<f64>`; rows without enough
//! history carry `None`.

use crate::domain::error::StockdashError;
use crate::domain::indicator::{
    IndicatorSeries, StdDevKind, calculate_daily_returns, calculate_rolling_stddev, calculate_sma,
};
use crate::domain::ohlcv::{OhlcvBar, PriceSeries};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_SMA_SHORT: usize = 50;
pub const DEFAULT_SMA_LONG: usize = 200;
pub const DEFAULT_VOLATILITY_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsConfig {
    pub sma_short: usize,
    pub sma_long: usize,
    pub volatility_window: usize,
    pub stddev_kind: StdDevKind,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            sma_short: DEFAULT_SMA_SHORT,
            sma_long: DEFAULT_SMA_LONG,
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
            stddev_kind: StdDevKind::Sample,
        }
    }
}

impl MetricsConfig {
    /// Reads the `[metrics]` section, falling back to defaults for absent keys.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockdashError> {
        let defaults = Self::default();
        let stddev_kind = match config.get_string("metrics", "stddev") {
            Some(s) => StdDevKind::parse(&s).ok_or_else(|| StockdashError::ConfigInvalid {
                section: "metrics".into(),
                key: "stddev".into(),
                reason: format!("expected 'sample' or 'population', got '{}'", s),
            })?,
            None => defaults.stddev_kind,
        };

        Ok(Self {
            sma_short: window(config, "sma_short", defaults.sma_short)?,
            sma_long: window(config, "sma_long", defaults.sma_long)?,
            volatility_window: window(config, "volatility_window", defaults.volatility_window)?,
            stddev_kind,
        })
    }
}

fn window(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, StockdashError> {
    let value = match config.get_string("metrics", key) {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| StockdashError::ConfigInvalid {
                section: "metrics".into(),
                key: key.into(),
                reason: format!("'{}' is not an integer", raw.trim()),
            })?,
        None => default as i64,
    };
    if value < 1 {
        return Err(StockdashError::ConfigInvalid {
            section: "metrics".into(),
            key: key.into(),
            reason: format!("window must be at least 1, got {}", value),
        });
    }
    Ok(value as usize)
}

/// Derived values attached to one row of the price series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedMetrics {
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub daily_return: Option<f64>,
    pub volatility: Option<f64>,
}

/// A price series paired row-for-row with its derived metrics.
#[derive(Debug, Clone)]
pub struct AugmentedSeries<'a> {
    pub series: &'a PriceSeries,
    pub metrics: Vec<DerivedMetrics>,
    pub config: MetricsConfig,
}

impl<'a> AugmentedSeries<'a> {
    pub fn symbol(&self) -> &str {
        self.series.symbol()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&OhlcvBar, &DerivedMetrics)> {
        self.series.bars().iter().zip(self.metrics.iter())
    }

    /// The last `n` rows, oldest first.
    pub fn tail(&self, n: usize) -> Vec<(&OhlcvBar, &DerivedMetrics)> {
        let skip = self.len().saturating_sub(n);
        self.rows().skip(skip).collect()
    }

    pub fn daily_returns(&self) -> Vec<Option<f64>> {
        self.metrics.iter().map(|m| m.daily_return).collect()
    }

    pub fn volatility(&self) -> Vec<Option<f64>> {
        self.metrics.iter().map(|m| m.volatility).collect()
    }

    pub fn sma_short(&self) -> Vec<Option<f64>> {
        self.metrics.iter().map(|m| m.sma_short).collect()
    }

    pub fn sma_long(&self) -> Vec<Option<f64>> {
        self.metrics.iter().map(|m| m.sma_long).collect()
    }
}

/// Computes all derived columns. The input series is only read.
pub fn compute_metrics<'a>(series: &'a PriceSeries, config: &MetricsConfig) -> AugmentedSeries<'a> {
    let closes = series.closes();

    let sma_short = calculate_sma(&closes, config.sma_short);
    let sma_long = calculate_sma(&closes, config.sma_long);
    let returns = calculate_daily_returns(&closes);
    let volatility =
        calculate_rolling_stddev(&returns.values, config.volatility_window, config.stddev_kind);

    let metrics = zip_columns(&sma_short, &sma_long, &returns, &volatility);

    AugmentedSeries {
        series,
        metrics,
        config: *config,
    }
}

/// Validates raw provider bars into a series ready for [`compute_metrics`].
pub fn build_series(symbol: &str, bars: Vec<OhlcvBar>) -> Result<PriceSeries, StockdashError> {
    PriceSeries::new(symbol, bars)
}

fn zip_columns(
    sma_short: &IndicatorSeries,
    sma_long: &IndicatorSeries,
    returns: &IndicatorSeries,
    volatility: &IndicatorSeries,
) -> Vec<DerivedMetrics> {
    (0..returns.len())
        .map(|i| DerivedMetrics {
            sma_short: sma_short.values[i],
            sma_long: sma_long.values[i],
            daily_return: returns.values[i],
            volatility: volatility.values[i],
        })
        .collect()
}

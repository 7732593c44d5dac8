//! Descriptive statistics per numeric column.

use crate::domain::indicator::{StdDevKind, stddev};
use crate::domain::metrics::AugmentedSeries;
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    /// Summarizes the defined values of a column; `None` entries are skipped.
    pub fn from_values(name: impl Into<String>, values: &[Option<f64>]) -> Self {
        let mut defined: Vec<f64> = values.iter().flatten().copied().collect();
        defined.sort_by(|a, b| a.total_cmp(b));

        let count = defined.len();
        let mean = if count > 0 {
            Some(defined.iter().sum::<f64>() / count as f64)
        } else {
            None
        };

        Self {
            name: name.into(),
            count,
            mean,
            std: stddev(&defined, StdDevKind::Sample),
            min: defined.first().copied(),
            q25: quantile(&defined, 0.25),
            median: quantile(&defined, 0.5),
            q75: quantile(&defined, 0.75),
            max: defined.last().copied(),
        }
    }
}

/// Linear interpolation between closest ranks over sorted values.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

fn column_of(bars: &[OhlcvBar], f: fn(&OhlcvBar) -> f64) -> Vec<Option<f64>> {
    bars.iter().map(|b| Some(f(b))).collect()
}

/// One summary per numeric column, in display order.
pub fn describe(augmented: &AugmentedSeries<'_>) -> Vec<ColumnSummary> {
    let bars = augmented.series.bars();

    vec![
        ColumnSummary::from_values("Open", &column_of(bars, |b| b.open)),
        ColumnSummary::from_values("High", &column_of(bars, |b| b.high)),
        ColumnSummary::from_values("Low", &column_of(bars, |b| b.low)),
        ColumnSummary::from_values("Close", &column_of(bars, |b| b.close)),
        ColumnSummary::from_values("Volume", &column_of(bars, |b| b.volume as f64)),
        ColumnSummary::from_values(
            format!("SMA {}", augmented.config.sma_short),
            &augmented.sma_short(),
        ),
        ColumnSummary::from_values(
            format!("SMA {}", augmented.config.sma_long),
            &augmented.sma_long(),
        ),
        ColumnSummary::from_values("Daily Return", &augmented.daily_returns()),
        ColumnSummary::from_values("Volatility", &augmented.volatility()),
    ]
}

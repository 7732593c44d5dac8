//! Rolling standard deviation over an optional-valued column.
//!
//! STDDEV(n)[i] = sqrt(sum((X[i-j] - mean)^2 for j in 0..n) / d)
//! where d = n - 1 for the sample estimator and d = n for the population one.
//! A row is missing unless all n values in its window are defined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};

/// Which standard deviation estimator to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdDevKind {
    /// Bessel-corrected, divides by n - 1.
    #[default]
    Sample,
    /// Divides by n.
    Population,
}

impl StdDevKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sample" => Some(StdDevKind::Sample),
            "population" => Some(StdDevKind::Population),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StdDevKind::Sample => "sample",
            StdDevKind::Population => "population",
        }
    }

    fn divisor(&self, n: usize) -> Option<f64> {
        match self {
            StdDevKind::Sample if n >= 2 => Some((n - 1) as f64),
            StdDevKind::Population if n >= 1 => Some(n as f64),
            _ => None,
        }
    }
}

/// Standard deviation of all values, `None` when the estimator is undefined for the count.
pub fn stddev(values: &[f64], kind: StdDevKind) -> Option<f64> {
    let divisor = kind.divisor(values.len())?;
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / divisor;
    Some(variance.sqrt())
}

pub fn calculate_rolling_stddev(
    input: &[Option<f64>],
    period: usize,
    kind: StdDevKind,
) -> IndicatorSeries {
    let mut values = Vec::with_capacity(input.len());
    let mut window: Vec<f64> = Vec::with_capacity(period);

    for i in 0..input.len() {
        let value = if period > 0 && i + 1 >= period {
            window.clear();
            window.extend(input[i + 1 - period..=i].iter().flatten());
            if window.len() == period {
                stddev(&window, kind)
            } else {
                None
            }
        } else {
            None
        };
        values.push(value);
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Volatility(period),
        values,
    }
}

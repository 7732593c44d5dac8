//! Equal-width binning of daily returns for the distribution chart, with a
//! Gaussian kernel density curve scaled to bin counts.

use crate::domain::indicator::{StdDevKind, stddev};

pub const DEFAULT_BINS: usize = 50;
pub const KDE_GRID_POINTS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Density curve sample, in expected observations per bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityPoint {
    pub x: f64,
    pub count: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    /// Empty when the bandwidth is undefined (fewer than two distinct values).
    pub density: Vec<DensityPoint>,
}

/// Scott's rule: sample standard deviation times `n^(-1/5)`.
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    let h = stddev(values, StdDevKind::Sample)? * (values.len() as f64).powf(-0.2);
    (h.is_finite() && h > 0.0).then_some(h)
}

/// Gaussian kernel density of `values` evaluated at `x`.
pub fn gaussian_kde(values: &[f64], bandwidth: f64, x: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let norm = values.len() as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt();
    values
        .iter()
        .map(|v| {
            let z = (x - v) / bandwidth;
            (-0.5 * z * z).exp()
        })
        .sum::<f64>()
        / norm
}

fn density_curve(values: &[f64], min: f64, max: f64, bin_width: f64) -> Vec<DensityPoint> {
    let Some(h) = scott_bandwidth(values) else {
        return Vec::new();
    };
    let scale = values.len() as f64 * bin_width;
    let step = (max - min) / (KDE_GRID_POINTS - 1) as f64;
    (0..KDE_GRID_POINTS)
        .map(|i| {
            let x = min + step * i as f64;
            DensityPoint {
                x,
                count: gaussian_kde(values, h, x) * scale,
            }
        })
        .collect()
}

impl Histogram {
    /// Bins the defined values into `bin_count` equal-width bins over [min, max].
    ///
    /// The maximum value lands in the last bin. When every value is equal a
    /// single bin holds them all and there is no density curve.
    pub fn from_values(values: &[Option<f64>], bin_count: usize) -> Self {
        let defined: Vec<f64> = values
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        if defined.is_empty() || bin_count == 0 {
            return Self::default();
        }

        let min = defined.iter().copied().fold(f64::INFINITY, f64::min);
        let max = defined.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if max == min {
            return Self {
                bins: vec![HistogramBin {
                    lower: min,
                    upper: max,
                    count: defined.len(),
                }],
                density: Vec::new(),
            };
        }

        let width = (max - min) / bin_count as f64;
        let mut bins: Vec<HistogramBin> = (0..bin_count)
            .map(|i| HistogramBin {
                lower: min + width * i as f64,
                upper: if i + 1 == bin_count {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                count: 0,
            })
            .collect();

        for &v in &defined {
            let idx = (((v - min) / width) as usize).min(bin_count - 1);
            bins[idx].count += 1;
        }

        let density = density_curve(&defined, min, max, width);
        Self { bins, density }
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

//! Daily return: fractional close-to-close change.
//!
//! RETURN[i] = C[i] / C[i-1] - 1
//! Row 0 is missing.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_daily_returns(closes: &[f64]) -> IndicatorSeries {
    let mut values = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        let value = if i == 0 {
            None
        } else {
            Some(closes[i] / closes[i - 1] - 1.0)
        };
        values.push(value);
    }

    IndicatorSeries {
        indicator_type: IndicatorType::DailyReturn,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_row_is_missing() {
        let series = calculate_daily_returns(&[10.0, 11.0]);
        assert_eq!(series.values[0], None);
        assert_relative_eq!(series.values[1].unwrap(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn known_sequence() {
        let series = calculate_daily_returns(&[10.0, 11.0, 9.0, 9.0, 12.0]);

        assert_eq!(series.values[0], None);
        assert_relative_eq!(series.values[1].unwrap(), 0.10, epsilon = 1e-12);
        assert_relative_eq!(series.values[2].unwrap(), -2.0 / 11.0, epsilon = 1e-12);
        assert_relative_eq!(series.values[3].unwrap(), 0.0);
        assert_relative_eq!(series.values[4].unwrap(), 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn single_and_empty_input() {
        assert_eq!(calculate_daily_returns(&[5.0]).values, vec![None]);
        assert!(calculate_daily_returns(&[]).is_empty());
    }
}

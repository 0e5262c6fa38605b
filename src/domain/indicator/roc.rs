//! ROC (Rate of Change) indicator implementation.
//!
//! ROC(n)[i] = ((C[i] - C[i-n]) / C[i-n]) * 100
//! If C[i-n] == 0: ROC = 0
//! Warmup: first n bars invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PricePoint;

pub(crate) fn rate_of_change(prev_close: f64, curr_close: f64) -> f64 {
    if prev_close == 0.0 {
        0.0
    } else {
        ((curr_close - prev_close) / prev_close) * 100.0
    }
}

pub fn calculate_roc(bars: &[PricePoint], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let valid = period > 0 && i >= period;

        let value = if valid {
            rate_of_change(bars[i - period].close, bar.close)
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: IndicatorValue::Simple(value),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Roc(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::bars_from_closes;

    #[test]
    fn roc_warmup() {
        let bars = bars_from_closes(&[100.0, 105.0, 110.0, 115.0, 120.0]);
        let series = calculate_roc(&bars, 3);

        assert!(!series.values[2].valid);
        assert!(series.values[3].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn roc_basic_calculation() {
        let bars = bars_from_closes(&[100.0, 105.0, 110.0, 115.0]);
        let series = calculate_roc(&bars, 2);

        let expected = ((110.0 - 100.0) / 100.0) * 100.0;
        assert!((series.values[2].value.as_simple().unwrap() - expected).abs() < f64::EPSILON);

        let expected = ((115.0 - 105.0) / 105.0) * 100.0;
        assert!((series.values[3].value.as_simple().unwrap() - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn roc_zero_division() {
        let bars = bars_from_closes(&[0.0, 100.0, 110.0]);
        let series = calculate_roc(&bars, 2);

        assert!(series.values[2].valid);
        assert_eq!(series.values[2].value.as_simple(), Some(0.0));
    }

    #[test]
    fn roc_negative_change() {
        let bars = bars_from_closes(&[100.0, 90.0, 80.0]);
        let series = calculate_roc(&bars, 2);

        let v = series.values[2].value.as_simple().unwrap();
        assert!((v + 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn roc_indicator_type() {
        let series = calculate_roc(&bars_from_closes(&[100.0, 105.0]), 10);
        assert_eq!(series.indicator_type, IndicatorType::Roc(10));
        assert!(series.values.iter().all(|p| !p.valid));
    }
}

//! Standard Deviation indicator.
//!
//! Population standard deviation over n closing prices.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PricePoint;

/// Mean and population standard deviation of one window, summed front to back.
pub(crate) fn mean_and_stddev<I>(window: I, period: usize) -> (f64, f64)
where
    I: Iterator<Item = f64> + Clone,
{
    let mean = window.clone().sum::<f64>() / period as f64;
    let variance = window
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / period as f64;
    (mean, variance.sqrt())
}

pub fn calculate_stddev(bars: &[PricePoint], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let valid = period > 0 && i + 1 >= period;

        let value = if valid {
            let window = &bars[i + 1 - period..=i];
            mean_and_stddev(window.iter().map(|b| b.close), period).1
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
        indicator_type: IndicatorType::Stddev(period),
        values,
    }
}

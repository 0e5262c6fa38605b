//! Simple moving averages of close and of volume.
//!
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PricePoint;

pub fn calculate_sma(bars: &[PricePoint], period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values: windowed_mean(bars, period, |b| b.close),
    }
}

/// Average volume over the last n bars, current bar included.
pub fn calculate_volume_sma(bars: &[PricePoint], period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::VolumeSma(period),
        values: windowed_mean(bars, period, |b| b.volume),
    }
}

fn windowed_mean(
    bars: &[PricePoint],
    period: usize,
    field: fn(&PricePoint) -> f64,
) -> Vec<IndicatorPoint> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let valid = period > 0 && i + 1 >= period;
            let value = if valid {
                bars[i + 1 - period..=i].iter().map(field).sum::<f64>() / period as f64
            } else {
                0.0
            };
            IndicatorPoint {
                timestamp: bar.timestamp,
                valid,
                value: IndicatorValue::Simple(value),
            }
        })
        .collect()
}

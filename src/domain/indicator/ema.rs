//! Exponential Moving Average.
//!
//! Seeded with the SMA of the first `n` closes, then
//! EMA = close * k + prev * (1 - k) with k = 2 / (n + 1).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PricePoint;
use std::cmp::Ordering;

pub fn calculate_ema(bars: &[PricePoint], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    if period > 0 {
        let k = 2.0 / (period as f64 + 1.0);
        let mut seed = 0.0;
        let mut ema = 0.0;
        for (i, bar) in bars.iter().enumerate() {
            let point = match (i + 1).cmp(&period) {
                Ordering::Less => {
                    seed += bar.close;
                    IndicatorPoint::warming(bar.timestamp)
                }
                Ordering::Equal => {
                    seed += bar.close;
                    ema = seed / period as f64;
                    IndicatorPoint::simple(bar.timestamp, ema)
                }
                Ordering::Greater => {
                    ema = bar.close * k + ema * (1.0 - k);
                    IndicatorPoint::simple(bar.timestamp, ema)
                }
            };
            values.push(point);
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}

//! Relative Strength Index with Wilder smoothing.
//!
//! The first averages are plain means over `n` changes; later ones follow
//! avg = (prev_avg * (n - 1) + current) / n. RSI is 100 when there are no
//! losses. The first `n` bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PricePoint;
use std::cmp::Ordering;

/// RSI from Wilder averages. Shared with the rolling form so both agree bit for bit.
pub(crate) fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

/// Split a close-to-close change into (gain, loss), both non-negative.
pub(crate) fn gain_loss(change: f64) -> (f64, f64) {
    if change > 0.0 {
        (change, 0.0)
    } else if change < 0.0 {
        (0.0, -change)
    } else {
        (0.0, 0.0)
    }
}

pub fn calculate_rsi(bars: &[PricePoint], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let n = period as f64;
    let (mut gain_sum, mut loss_sum) = (0.0, 0.0);
    let (mut avg_gain, mut avg_loss) = (0.0, 0.0);

    for (i, bar) in bars.iter().enumerate() {
        // bar i closes the i-th price change
        if i == 0 || period == 0 {
            values.push(IndicatorPoint::warming(bar.timestamp));
            continue;
        }
        let (gain, loss) = gain_loss(bar.close - bars[i - 1].close);
        let point = match i.cmp(&period) {
            Ordering::Less => {
                gain_sum += gain;
                loss_sum += loss;
                IndicatorPoint::warming(bar.timestamp)
            }
            Ordering::Equal => {
                gain_sum += gain;
                loss_sum += loss;
                avg_gain = gain_sum / n;
                avg_loss = loss_sum / n;
                IndicatorPoint::simple(bar.timestamp, rsi_from_averages(avg_gain, avg_loss))
            }
            Ordering::Greater => {
                avg_gain = (avg_gain * (period - 1) as f64 + gain) / n;
                avg_loss = (avg_loss * (period - 1) as f64 + loss) / n;
                IndicatorPoint::simple(bar.timestamp, rsi_from_averages(avg_gain, avg_loss))
            }
        };
        values.push(point);
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

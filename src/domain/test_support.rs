//! Candle builders shared by unit tests.

use crate::domain::ohlcv::PricePoint;
use chrono::{Duration, NaiveDate, NaiveDateTime};

pub(crate) fn ts(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::hours(i as i64)
}

pub(crate) fn bars_from_closes(closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            timestamp: ts(i),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Candles with a high/low spread and an explicit volume per bar.
pub(crate) fn bars_with_volume(closes: &[f64], volumes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| PricePoint {
            timestamp: ts(i),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume,
        })
        .collect()
}

//! Shared helpers for integration tests.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use confluence::domain::error::ConfluenceError;
use confluence::domain::ohlcv::PricePoint;
use confluence::domain::price_series::PriceSeries;
use confluence::ports::data_port::DataPort;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

pub struct MockDataPort {
    pub series: HashMap<(String, String), PriceSeries>,
    pub fail_symbols: Vec<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
            fail_symbols: Vec::new(),
        }
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        let key = (series.symbol().to_string(), series.timeframe().to_string());
        self.series.insert(key, series);
        self
    }

    pub fn failing(mut self, symbol: &str) -> Self {
        self.fail_symbols.push(symbol.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(&self, symbol: &str, timeframe: &str) -> Result<PriceSeries, ConfluenceError> {
        if self.fail_symbols.iter().any(|s| s == symbol) {
            return Err(ConfluenceError::Data {
                reason: format!("mock failure for {symbol}"),
            });
        }
        Ok(self
            .series
            .get(&(symbol.to_string(), timeframe.to_string()))
            .cloned()
            .unwrap_or_else(|| PriceSeries::new(symbol, timeframe)))
    }

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, ConfluenceError> {
        let mut symbols: Vec<String> = self
            .series
            .keys()
            .filter(|(_, tf)| tf == timeframe)
            .map(|(s, _)| s.clone())
            .collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// 2024-01-01 00:00 plus `i` hours.
pub fn ts(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::hours(i as i64)
}

pub fn bar(i: usize, close: f64, volume: f64) -> PricePoint {
    PricePoint {
        timestamp: ts(i),
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume,
    }
}

pub fn bars(closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| bar(i, c, 1000.0))
        .collect()
}

pub fn make_series(symbol: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::from_points(symbol, "1h", bars(closes)).unwrap()
}

/// Oscillating closes with a volume spike every sixth bar.
pub fn wave_bars(n: usize, base: f64) -> Vec<PricePoint> {
    (0..n)
        .map(|i| {
            let close = base + base * 0.15 * (i as f64 / 9.0).sin();
            let volume = if i % 6 == 0 { 4000.0 } else { 1000.0 };
            bar(i, close, volume)
        })
        .collect()
}

/// 29 closes stepping down from 100, then a flush to 70.
pub fn decline_100_to_70() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..29).map(|i| 100.0 - 0.5 * i as f64).collect();
    closes.push(70.0);
    closes
}

/// Write `<symbol>_<timeframe>.csv` under `dir`.
pub fn write_candles(dir: &Path, symbol: &str, timeframe: &str, points: &[PricePoint]) {
    let path = dir.join(format!("{symbol}_{timeframe}.csv"));
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "timestamp,open,high,low,close,volume").unwrap();
    for p in points {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            p.timestamp.format("%Y-%m-%d %H:%M:%S"),
            p.open,
            p.high,
            p.low,
            p.close,
            p.volume
        )
        .unwrap();
    }
}

//! CSV candle supplier.
//!
//! One file per symbol and timeframe, named `<symbol>_<timeframe>.csv`, with
//! the header `timestamp,open,high,low,close,volume`.

use crate::domain::error::ConfluenceError;
use crate::domain::ohlcv::PricePoint;
use crate::domain::price_series::PriceSeries;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, timeframe))
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD` and Unix seconds.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        let secs: i64 = raw.parse().ok()?;
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc());
    }
    None
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    name: &str,
    line: u64,
) -> Result<&'r str, ConfluenceError> {
    record.get(idx).ok_or_else(|| ConfluenceError::Data {
        reason: format!("line {}: missing {} column", line, name),
    })
}

fn number(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
    line: u64,
) -> Result<f64, ConfluenceError> {
    let raw = field(record, idx, name, line)?;
    raw.trim().parse().map_err(|e| ConfluenceError::Data {
        reason: format!("line {}: invalid {} value '{}': {}", line, name, raw, e),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_series(&self, symbol: &str, timeframe: &str) -> Result<PriceSeries, ConfluenceError> {
        let path = self.csv_path(symbol, timeframe);
        let content = fs::read_to_string(&path).map_err(|e| ConfluenceError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| ConfluenceError::Data {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;
            let line = record.position().map_or(0, |p| p.line());

            let raw_ts = field(&record, 0, "timestamp", line)?;
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| ConfluenceError::Data {
                reason: format!("line {}: invalid timestamp '{}'", line, raw_ts),
            })?;

            points.push(PricePoint {
                timestamp,
                open: number(&record, 1, "open", line)?,
                high: number(&record, 2, "high", line)?,
                low: number(&record, 3, "low", line)?,
                close: number(&record, 4, "close", line)?,
                volume: number(&record, 5, "volume", line)?,
            });
        }

        tracing::info!(
            symbol,
            timeframe,
            candles = points.len(),
            path = %path.display(),
            "loaded candles"
        );
        // Rows keep file order; the engine rejects out-of-order candles.
        Ok(PriceSeries::from_points_unchecked(symbol, timeframe, points))
    }

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, ConfluenceError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| ConfluenceError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", timeframe);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| ConfluenceError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(&suffix) {
                if !symbol.is_empty() {
                    symbols.push(symbol.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "timestamp,open,high,low,close,volume\n\
            2024-01-15 00:00:00,100.0,110.0,90.0,105.0,50000.5\n\
            2024-01-15 01:00:00,105.0,115.0,100.0,110.0,60000\n\
            2024-01-15T02:00:00Z,110.0,120.0,105.0,115.0,55000\n";

        fs::write(path.join("BTC-USDT_1h.csv"), csv_content).unwrap();
        fs::write(
            path.join("ETH-USDT_1h.csv"),
            "timestamp,open,high,low,close,volume\n",
        )
        .unwrap();
        fs::write(
            path.join("BTC-USDT_1d.csv"),
            "timestamp,open,high,low,close,volume\n",
        )
        .unwrap();

        (dir, path)
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn fetch_series_returns_correct_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter.fetch_series("BTC-USDT", "1h").unwrap();
        let bars = series.points();

        assert_eq!(series.symbol(), "BTC-USDT");
        assert_eq!(series.timeframe(), "1h");
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].timestamp, at(15, 0));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000.5);
        assert_eq!(bars[2].timestamp, at(15, 2));
    }

    #[test]
    fn fetch_series_keeps_supplier_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("X_1h.csv"),
            "timestamp,open,high,low,close,volume\n\
             2024-01-16,1,1,1,1,1\n\
             2024-01-15,1,1,1,1,1\n",
        )
        .unwrap();
        let series = CsvAdapter::new(dir.path().to_path_buf())
            .fetch_series("X", "1h")
            .unwrap();
        assert_eq!(series.points()[0].timestamp, at(16, 0));
        assert!(series.validate().is_err());
    }

    #[test]
    fn fetch_series_reports_bad_numbers() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("X_1h.csv"),
            "timestamp,open,high,low,close,volume\n2024-01-15,1,abc,1,1,1\n",
        )
        .unwrap();
        let err = CsvAdapter::new(dir.path().to_path_buf())
            .fetch_series("X", "1h")
            .unwrap_err();
        assert!(matches!(err, ConfluenceError::Data { reason } if reason.contains("high")));
    }

    #[test]
    fn fetch_series_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(matches!(
            adapter.fetch_series("XYZ", "1h"),
            Err(ConfluenceError::Data { .. })
        ));
    }

    #[test]
    fn list_symbols_filters_by_timeframe() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        assert_eq!(adapter.list_symbols("1h").unwrap(), vec!["BTC-USDT", "ETH-USDT"]);
        assert_eq!(adapter.list_symbols("1d").unwrap(), vec!["BTC-USDT"]);
    }

    #[test]
    fn timestamp_formats() {
        assert_eq!(parse_timestamp("2024-01-15"), Some(at(15, 0)));
        assert_eq!(parse_timestamp("2024-01-15 01:00:00"), Some(at(15, 1)));
        assert_eq!(parse_timestamp("2024-01-15T03:00:00+02:00"), Some(at(15, 1)));
        assert_eq!(parse_timestamp("1705280400"), Some(at(15, 1)));
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}

//! Candle supplier port trait.

use crate::domain::error::ConfluenceError;
use crate::domain::price_series::PriceSeries;

pub trait DataPort {
    /// Every candle for `symbol` at `timeframe`, in supplier order. The series
    /// is not validated; the engine rejects bad candles itself.
    fn fetch_series(&self, symbol: &str, timeframe: &str) -> Result<PriceSeries, ConfluenceError>;

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, ConfluenceError>;
}

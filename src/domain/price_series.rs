//! Append-only candle series for one symbol and timeframe.

use crate::domain::error::ConfluenceError;
use crate::domain::ohlcv::PricePoint;

#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    timeframe: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
            points: Vec::new(),
        }
    }

    /// Build a series from already ordered candles, rejecting the first bad one.
    pub fn from_points(
        symbol: impl Into<String>,
        timeframe: impl Into<String>,
        points: Vec<PricePoint>,
    ) -> Result<Self, ConfluenceError> {
        let mut series = Self::new(symbol, timeframe);
        series.points.reserve(points.len());
        for point in points {
            series.push(point)?;
        }
        Ok(series)
    }

    /// Wrap candles without checking them. Use [`PriceSeries::validate`] before
    /// trusting the result.
    pub fn from_points_unchecked(
        symbol: impl Into<String>,
        timeframe: impl Into<String>,
        points: Vec<PricePoint>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
            points,
        }
    }

    /// Append one candle. A rejected candle leaves the series unchanged.
    pub fn push(&mut self, point: PricePoint) -> Result<(), ConfluenceError> {
        self.check_next(&point)?;
        self.points.push(point);
        Ok(())
    }

    /// Check that `point` could be appended without appending it.
    pub fn check_next(&self, point: &PricePoint) -> Result<(), ConfluenceError> {
        let index = self.points.len();
        if let Some(reason) = point.defect() {
            return Err(self.reject(index, reason));
        }
        if let Some(last) = self.points.last() {
            if point.timestamp <= last.timestamp {
                return Err(self.reject(
                    index,
                    format!(
                        "timestamp {} not after previous {}",
                        point.timestamp, last.timestamp
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Validate every candle and the ordering of the whole series.
    pub fn validate(&self) -> Result<(), ConfluenceError> {
        for (i, point) in self.points.iter().enumerate() {
            if let Some(reason) = point.defect() {
                return Err(self.reject(i, reason));
            }
            if i > 0 && point.timestamp <= self.points[i - 1].timestamp {
                return Err(self.reject(
                    i,
                    format!(
                        "timestamp {} not after previous {}",
                        point.timestamp,
                        self.points[i - 1].timestamp
                    ),
                ));
            }
        }
        Ok(())
    }

    fn reject(&self, index: usize, reason: String) -> ConfluenceError {
        ConfluenceError::InvalidPriceData {
            symbol: self.symbol.clone(),
            index,
            reason,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> &str {
        &self.timeframe
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

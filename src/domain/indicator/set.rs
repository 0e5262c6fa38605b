//! Indicator lookup shared by batch and rolling computation.

use crate::domain::indicator::{calculate, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PricePoint;
use std::collections::HashMap;

/// Read access to indicator values, counted back from the latest bar.
pub trait IndicatorSource {
    /// Value of `indicator` at `back` bars before the latest one, or `None`
    /// while the indicator is warming up or was never requested.
    fn value(&self, indicator: &IndicatorType, back: usize) -> Option<IndicatorValue>;

    fn simple(&self, indicator: &IndicatorType, back: usize) -> Option<f64> {
        self.value(indicator, back).and_then(|v| v.as_simple())
    }
}

/// Indicators computed over a whole slice of candles at once.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSet {
    series: HashMap<IndicatorType, IndicatorSeries>,
}

impl IndicatorSet {
    pub fn compute(bars: &[PricePoint], indicators: &[IndicatorType]) -> Self {
        let mut series = HashMap::with_capacity(indicators.len());
        for indicator in indicators {
            if !series.contains_key(indicator) {
                series.insert(indicator.clone(), calculate(bars, indicator));
            }
        }
        Self { series }
    }

    pub fn series(&self, indicator: &IndicatorType) -> Option<&IndicatorSeries> {
        self.series.get(indicator)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl IndicatorSource for IndicatorSet {
    fn value(&self, indicator: &IndicatorType, back: usize) -> Option<IndicatorValue> {
        let values = &self.series.get(indicator)?.values;
        let idx = values.len().checked_sub(back + 1)?;
        let point = &values[idx];
        point.valid.then_some(point.value)
    }
}

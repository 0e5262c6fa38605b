//! MACD signal-line crossover confirmed by a growing histogram.

use super::Strategy;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::{IndicatorSource, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PricePoint;
use crate::domain::signal::{Direction, StrategySignal};

pub const NAME: &str = "macd_momentum";

#[derive(Debug, Clone, PartialEq)]
pub struct MacdMomentumParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
    pub atr_period: usize,
    /// Histogram of `histogram_scale * ATR` maps to full confidence.
    pub histogram_scale: f64,
}

impl Default for MacdMomentumParams {
    fn default() -> Self {
        Self {
            fast_period: DEFAULT_FAST,
            slow_period: DEFAULT_SLOW,
            signal_period: DEFAULT_SIGNAL,
            atr_period: 14,
            histogram_scale: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MacdMomentum {
    params: MacdMomentumParams,
}

struct MacdReading {
    line: f64,
    signal: f64,
    histogram: f64,
}

fn macd_at(
    indicators: &dyn IndicatorSource,
    macd: &IndicatorType,
    back: usize,
) -> Option<MacdReading> {
    match indicators.value(macd, back)? {
        IndicatorValue::Macd {
            line,
            signal,
            histogram,
        } => Some(MacdReading {
            line,
            signal,
            histogram,
        }),
        _ => None,
    }
}

impl MacdMomentum {
    pub fn new(params: MacdMomentumParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MacdMomentumParams {
        &self.params
    }

    fn macd(&self) -> IndicatorType {
        IndicatorType::Macd {
            fast: self.params.fast_period,
            slow: self.params.slow_period,
            signal: self.params.signal_period,
        }
    }

    fn atr(&self) -> IndicatorType {
        IndicatorType::Atr(self.params.atr_period)
    }
}

impl Strategy for MacdMomentum {
    fn name(&self) -> &'static str {
        NAME
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![self.macd(), self.atr()]
    }

    fn lookback(&self) -> usize {
        (self.macd().warmup() + 1).max(self.atr().warmup())
    }

    fn evaluate(&self, bars: &[PricePoint], indicators: &dyn IndicatorSource) -> StrategySignal {
        let need = self.lookback();
        if bars.len() < need {
            return StrategySignal::insufficient_history(NAME, bars.len(), need);
        }
        let macd = self.macd();
        let (Some(now), Some(prev), Some(atr)) = (
            macd_at(indicators, &macd, 0),
            macd_at(indicators, &macd, 1),
            indicators.simple(&self.atr(), 0),
        ) else {
            return StrategySignal::insufficient_history(NAME, bars.len(), need);
        };

        let confidence = if atr > 0.0 {
            now.histogram.abs() / (self.params.histogram_scale * atr)
        } else {
            0.0
        };

        let crossed_up = prev.line <= prev.signal && now.line > now.signal;
        let crossed_down = prev.line >= prev.signal && now.line < now.signal;

        let signal = if crossed_up && now.histogram > prev.histogram {
            StrategySignal::new(NAME, Direction::Long, confidence, "MACD crossed above signal line")
        } else if crossed_down && now.histogram < prev.histogram {
            StrategySignal::new(
                NAME,
                Direction::Short,
                confidence,
                "MACD crossed below signal line",
            )
        } else {
            StrategySignal::neutral(NAME, "no confirmed MACD crossover")
        };

        signal
            .with_metric("macd", now.line)
            .with_metric("macd_signal", now.signal)
            .with_metric("macd_histogram", now.histogram)
            .with_metric("atr", atr)
    }
}

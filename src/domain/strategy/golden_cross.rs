//! Fast/slow EMA crossover.

use super::Strategy;
use crate::domain::indicator::{IndicatorSource, IndicatorType};
use crate::domain::ohlcv::PricePoint;
use crate::domain::signal::{Direction, StrategySignal};

pub const NAME: &str = "golden_cross";

#[derive(Debug, Clone, PartialEq)]
pub struct GoldenCrossParams {
    pub fast_period: usize,
    pub slow_period: usize,
    /// Relative EMA separation that maps to full confidence is `1 / scale`.
    pub separation_scale: f64,
}

impl Default for GoldenCrossParams {
    fn default() -> Self {
        Self {
            fast_period: 8,
            slow_period: 21,
            separation_scale: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoldenCross {
    params: GoldenCrossParams,
}

impl GoldenCross {
    pub fn new(params: GoldenCrossParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GoldenCrossParams {
        &self.params
    }

    fn fast(&self) -> IndicatorType {
        IndicatorType::Ema(self.params.fast_period)
    }

    fn slow(&self) -> IndicatorType {
        IndicatorType::Ema(self.params.slow_period)
    }
}

impl Strategy for GoldenCross {
    fn name(&self) -> &'static str {
        NAME
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![self.fast(), self.slow()]
    }

    fn lookback(&self) -> usize {
        // One extra bar to see the previous relationship.
        self.fast().warmup().max(self.slow().warmup()) + 1
    }

    fn evaluate(&self, bars: &[PricePoint], indicators: &dyn IndicatorSource) -> StrategySignal {
        let need = self.lookback();
        if bars.len() < need {
            return StrategySignal::insufficient_history(NAME, bars.len(), need);
        }
        let (Some(fast), Some(slow), Some(prev_fast), Some(prev_slow)) = (
            indicators.simple(&self.fast(), 0),
            indicators.simple(&self.slow(), 0),
            indicators.simple(&self.fast(), 1),
            indicators.simple(&self.slow(), 1),
        ) else {
            return StrategySignal::insufficient_history(NAME, bars.len(), need);
        };

        let trend = if fast > slow {
            1.0
        } else if fast < slow {
            -1.0
        } else {
            0.0
        };
        let separation = if slow != 0.0 {
            (fast - slow).abs() / slow.abs()
        } else {
            0.0
        };
        let confidence = self.params.separation_scale * separation;

        let signal = if prev_fast < prev_slow && fast >= slow {
            StrategySignal::new(
                NAME,
                Direction::Long,
                confidence,
                format!(
                    "EMA({}) crossed above EMA({})",
                    self.params.fast_period, self.params.slow_period
                ),
            )
        } else if prev_fast > prev_slow && fast <= slow {
            StrategySignal::new(
                NAME,
                Direction::Short,
                confidence,
                format!(
                    "EMA({}) crossed below EMA({})",
                    self.params.fast_period, self.params.slow_period
                ),
            )
        } else {
            StrategySignal::neutral(NAME, "no crossover on this bar")
        };

        signal
            .with_metric("fast_ema", fast)
            .with_metric("slow_ema", slow)
            .with_metric("trend", trend)
    }
}

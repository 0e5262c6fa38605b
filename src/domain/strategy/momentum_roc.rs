//! Rate-of-change breakout confirmed by volume and trend.

use super::Strategy;
use crate::domain::indicator::{IndicatorSource, IndicatorType};
use crate::domain::ohlcv::PricePoint;
use crate::domain::signal::{Direction, StrategySignal};

pub const NAME: &str = "momentum_roc";

#[derive(Debug, Clone, PartialEq)]
pub struct MomentumRocParams {
    pub roc_period: usize,
    /// Minimum |ROC| in percent.
    pub threshold_pct: f64,
    pub volume_period: usize,
    pub volume_mult: f64,
    pub trend_period: usize,
    /// |ROC| in percent that maps to full confidence.
    pub full_scale_pct: f64,
}

impl Default for MomentumRocParams {
    fn default() -> Self {
        Self {
            roc_period: 10,
            threshold_pct: 5.0,
            volume_period: 20,
            volume_mult: 1.5,
            trend_period: 8,
            full_scale_pct: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MomentumRoc {
    params: MomentumRocParams,
}

impl MomentumRoc {
    pub fn new(params: MomentumRocParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MomentumRocParams {
        &self.params
    }

    fn roc(&self) -> IndicatorType {
        IndicatorType::Roc(self.params.roc_period)
    }

    fn volume(&self) -> IndicatorType {
        IndicatorType::VolumeSma(self.params.volume_period)
    }

    fn trend(&self) -> IndicatorType {
        IndicatorType::Ema(self.params.trend_period)
    }
}

impl Strategy for MomentumRoc {
    fn name(&self) -> &'static str {
        NAME
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![self.roc(), self.volume(), self.trend()]
    }

    fn lookback(&self) -> usize {
        // Volume average and trend slope both look one bar back.
        self.roc()
            .warmup()
            .max(self.volume().warmup() + 1)
            .max(self.trend().warmup() + 1)
    }

    fn evaluate(&self, bars: &[PricePoint], indicators: &dyn IndicatorSource) -> StrategySignal {
        let need = self.lookback();
        let (Some(last), true) = (bars.last(), bars.len() >= need) else {
            return StrategySignal::insufficient_history(NAME, bars.len(), need);
        };
        let (Some(roc), Some(avg_volume), Some(trend), Some(prev_trend)) = (
            indicators.simple(&self.roc(), 0),
            indicators.simple(&self.volume(), 1),
            indicators.simple(&self.trend(), 0),
            indicators.simple(&self.trend(), 1),
        ) else {
            return StrategySignal::insufficient_history(NAME, bars.len(), need);
        };

        let p = &self.params;
        let volume_ratio = if avg_volume > 0.0 {
            last.volume / avg_volume
        } else {
            0.0
        };
        let slope = trend - prev_trend;
        let volume_confirmed = volume_ratio > p.volume_mult;
        let confidence = roc.abs() / p.full_scale_pct;

        let exit_advised = indicators
            .simple(&self.roc(), 1)
            .is_some_and(|prev| (prev > 0.0 && roc <= 0.0) || (prev < 0.0 && roc >= 0.0));

        let signal = if roc > p.threshold_pct && volume_confirmed && slope > 0.0 {
            StrategySignal::new(
                NAME,
                Direction::Long,
                confidence,
                format!("ROC {roc:.2}% on {volume_ratio:.1}x volume, trend rising"),
            )
        } else if roc < -p.threshold_pct && volume_confirmed && slope < 0.0 {
            StrategySignal::new(
                NAME,
                Direction::Short,
                confidence,
                format!("ROC {roc:.2}% on {volume_ratio:.1}x volume, trend falling"),
            )
        } else {
            StrategySignal::neutral(NAME, format!("ROC {roc:.2}% not confirmed"))
        };

        signal
            .with_metric("roc", roc)
            .with_metric("volume_ratio", volume_ratio)
            .with_metric("trend_slope", slope)
            .with_exit(exit_advised)
    }
}

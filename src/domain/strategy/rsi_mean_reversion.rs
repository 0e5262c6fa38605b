//! RSI + Bollinger band mean reversion.

use super::Strategy;
use crate::domain::indicator::{IndicatorSource, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PricePoint;
use crate::domain::signal::{Direction, StrategySignal};

pub const NAME: &str = "rsi_mean_reversion";

#[derive(Debug, Clone, PartialEq)]
pub struct RsiMeanReversionParams {
    pub rsi_period: usize,
    pub bb_period: usize,
    pub bb_mult: f64,
    pub oversold: f64,
    pub overbought: f64,
    pub exit_level: f64,
}

impl Default for RsiMeanReversionParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            bb_period: 20,
            bb_mult: 2.0,
            oversold: 30.0,
            overbought: 70.0,
            exit_level: 50.0,
        }
    }
}

impl RsiMeanReversionParams {
    /// Band multiplier in hundredths, as the indicator key stores it. `None`
    /// when it rounds to zero or does not fit.
    pub fn bb_mult_x100(&self) -> Option<u32> {
        let scaled = (self.bb_mult * 100.0).round();
        (1.0..=u32::MAX as f64).contains(&scaled).then_some(scaled as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RsiMeanReversion {
    params: RsiMeanReversionParams,
}

impl RsiMeanReversion {
    pub fn new(params: RsiMeanReversionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RsiMeanReversionParams {
        &self.params
    }

    fn rsi(&self) -> IndicatorType {
        IndicatorType::Rsi(self.params.rsi_period)
    }

    fn bands(&self) -> IndicatorType {
        IndicatorType::Bollinger {
            period: self.params.bb_period,
            stddev_mult_x100: self.params.bb_mult_x100().unwrap_or(0),
        }
    }
}

impl Strategy for RsiMeanReversion {
    fn name(&self) -> &'static str {
        NAME
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![self.rsi(), self.bands()]
    }

    fn lookback(&self) -> usize {
        self.rsi().warmup().max(self.bands().warmup())
    }

    fn evaluate(&self, bars: &[PricePoint], indicators: &dyn IndicatorSource) -> StrategySignal {
        let need = self.lookback();
        let (Some(last), true) = (bars.last(), bars.len() >= need) else {
            return StrategySignal::insufficient_history(NAME, bars.len(), need);
        };
        let rsi = indicators.simple(&self.rsi(), 0);
        let bands = indicators.value(&self.bands(), 0);
        let (
            Some(rsi),
            Some(IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            }),
        ) = (rsi, bands)
        else {
            return StrategySignal::insufficient_history(NAME, bars.len(), need);
        };

        let p = &self.params;
        let close = last.close;

        let rsi_crossed_exit = indicators
            .simple(&self.rsi(), 1)
            .is_some_and(|prev| (prev < p.exit_level) != (rsi < p.exit_level));
        let touched_middle = bars.len() >= 2 && {
            let prev_close = bars[bars.len() - 2].close;
            (prev_close < middle && close >= middle) || (prev_close > middle && close <= middle)
        };

        // Zero-width bands mean a flat window; RSI is pinned at 100 there.
        let signal = if upper <= lower {
            StrategySignal::neutral(NAME, "flat window, bands collapsed")
        } else if rsi < p.oversold && close <= lower {
            StrategySignal::new(
                NAME,
                Direction::Long,
                (p.oversold - rsi) / p.oversold,
                format!("RSI {rsi:.1} below {} with close at/below lower band", p.oversold),
            )
        } else if rsi > p.overbought && close >= upper {
            StrategySignal::new(
                NAME,
                Direction::Short,
                (rsi - p.overbought) / (100.0 - p.overbought),
                format!("RSI {rsi:.1} above {} with close at/above upper band", p.overbought),
            )
        } else {
            StrategySignal::neutral(NAME, format!("RSI {rsi:.1} without band confirmation"))
        };

        signal
            .with_metric("rsi", rsi)
            .with_metric("bb_upper", upper)
            .with_metric("bb_middle", middle)
            .with_metric("bb_lower", lower)
            .with_exit(rsi_crossed_exit || touched_middle)
    }
}

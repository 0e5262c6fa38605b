//! Strategy modules.
//!
//! Every strategy turns indicator values for the latest bar into one
//! [`StrategySignal`]. The variant set is closed: [`StrategyKind`] wraps the
//! four implementations and is what the engine holds.

pub mod golden_cross;
pub mod macd_momentum;
pub mod momentum_roc;
pub mod rsi_mean_reversion;

pub use golden_cross::{GoldenCross, GoldenCrossParams};
pub use macd_momentum::{MacdMomentum, MacdMomentumParams};
pub use momentum_roc::{MomentumRoc, MomentumRocParams};
pub use rsi_mean_reversion::{RsiMeanReversion, RsiMeanReversionParams};

use crate::domain::indicator::{IndicatorSet, IndicatorSource, IndicatorType};
use crate::domain::ohlcv::PricePoint;
use crate::domain::signal::StrategySignal;

/// A directional strategy over the latest bar of a candle series.
pub trait Strategy: Send + Sync {
    /// Stable identifier, also the strategy's key in configuration.
    fn name(&self) -> &'static str;

    /// Indicators this strategy reads through [`IndicatorSource`].
    fn required_indicators(&self) -> Vec<IndicatorType>;

    /// Bars needed before the strategy can emit anything but NEUTRAL.
    fn lookback(&self) -> usize;

    /// Evaluate the latest bar. `indicators` must be aligned with `bars`.
    /// Never fails: short history yields a neutral signal.
    fn evaluate(&self, bars: &[PricePoint], indicators: &dyn IndicatorSource) -> StrategySignal;

    /// Compute the required indicators from scratch and evaluate.
    fn evaluate_series(&self, bars: &[PricePoint]) -> StrategySignal {
        let indicators = IndicatorSet::compute(bars, &self.required_indicators());
        self.evaluate(bars, &indicators)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyKind {
    RsiMeanReversion(RsiMeanReversion),
    GoldenCross(GoldenCross),
    MacdMomentum(MacdMomentum),
    MomentumRoc(MomentumRoc),
}

impl StrategyKind {
    fn inner(&self) -> &dyn Strategy {
        match self {
            StrategyKind::RsiMeanReversion(s) => s,
            StrategyKind::GoldenCross(s) => s,
            StrategyKind::MacdMomentum(s) => s,
            StrategyKind::MomentumRoc(s) => s,
        }
    }
}

impl Strategy for StrategyKind {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        self.inner().required_indicators()
    }

    fn lookback(&self) -> usize {
        self.inner().lookback()
    }

    fn evaluate(&self, bars: &[PricePoint], indicators: &dyn IndicatorSource) -> StrategySignal {
        self.inner().evaluate(bars, indicators)
    }
}

//! Immutable engine configuration.

use crate::domain::combiner::Weights;
use crate::domain::decision::DEFAULT_MIN_CONFIDENCE;
use crate::domain::strategy::{
    golden_cross, macd_momentum, momentum_roc, rsi_mean_reversion, GoldenCross,
    GoldenCrossParams, MacdMomentum, MacdMomentumParams, MomentumRoc, MomentumRocParams,
    RsiMeanReversion, RsiMeanReversionParams, Strategy, StrategyKind,
};
use std::path::PathBuf;

pub const DEFAULT_STRONG_SCORE: f64 = 0.6;

/// Strategy names in evaluation order.
pub const STRATEGY_NAMES: [&str; 4] = [
    rsi_mean_reversion::NAME,
    golden_cross::NAME,
    macd_momentum::NAME,
    momentum_roc::NAME,
];

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub weights: Weights,
    pub rsi_mean_reversion: RsiMeanReversionParams,
    pub golden_cross: GoldenCrossParams,
    pub macd_momentum: MacdMomentumParams,
    pub momentum_roc: MomentumRocParams,
    pub min_confidence: f64,
    /// |score| at or above which alerts are labelled STRONG.
    pub strong_score: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: default_weights(),
            rsi_mean_reversion: RsiMeanReversionParams::default(),
            golden_cross: GoldenCrossParams::default(),
            macd_momentum: MacdMomentumParams::default(),
            momentum_roc: MomentumRocParams::default(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            strong_score: DEFAULT_STRONG_SCORE,
        }
    }
}

/// Where candles come from: `[data]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub path: PathBuf,
    pub timeframe: String,
    /// Empty means every symbol the data source offers.
    pub symbols: Vec<String>,
}

impl DataSettings {
    pub const DEFAULT_TIMEFRAME: &'static str = "1h";
}

/// Protective exits for the replay driver: `[replay]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySettings {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            stop_loss_pct: 5.0,
            take_profit_pct: 10.0,
        }
    }
}

/// Every strategy at weight 1.
pub fn default_weights() -> Weights {
    STRATEGY_NAMES
        .iter()
        .map(|name| (name.to_string(), 1.0))
        .collect()
}

impl EngineConfig {
    pub fn strategies(&self) -> Vec<StrategyKind> {
        vec![
            StrategyKind::RsiMeanReversion(RsiMeanReversion::new(self.rsi_mean_reversion.clone())),
            StrategyKind::GoldenCross(GoldenCross::new(self.golden_cross.clone())),
            StrategyKind::MacdMomentum(MacdMomentum::new(self.macd_momentum.clone())),
            StrategyKind::MomentumRoc(MomentumRoc::new(self.momentum_roc.clone())),
        ]
    }

    /// Longest strategy lookback: bars needed before every strategy can vote.
    pub fn min_history(&self) -> usize {
        self.strategies()
            .iter()
            .map(|s| s.lookback())
            .max()
            .unwrap_or(0)
    }

    pub fn weight(&self, strategy: &str) -> f64 {
        self.weights.get(strategy).copied().unwrap_or(0.0)
    }

    /// The configuration as `(section, key, value)` INI entries.
    ///
    /// Loading these entries back through `build_engine_config` yields an
    /// equal configuration.
    pub fn to_entries(&self) -> Vec<(&'static str, &'static str, String)> {
        let mut entries = vec![
            ("engine", "min_confidence", self.min_confidence.to_string()),
            ("engine", "strong_score", self.strong_score.to_string()),
        ];
        for name in STRATEGY_NAMES {
            entries.push(("weights", name, self.weight(name).to_string()));
        }

        let r = &self.rsi_mean_reversion;
        let section = rsi_mean_reversion::NAME;
        entries.extend([
            (section, "rsi_period", r.rsi_period.to_string()),
            (section, "bb_period", r.bb_period.to_string()),
            (section, "bb_mult", r.bb_mult.to_string()),
            (section, "oversold", r.oversold.to_string()),
            (section, "overbought", r.overbought.to_string()),
            (section, "exit_level", r.exit_level.to_string()),
        ]);

        let g = &self.golden_cross;
        let section = golden_cross::NAME;
        entries.extend([
            (section, "fast_period", g.fast_period.to_string()),
            (section, "slow_period", g.slow_period.to_string()),
            (section, "separation_scale", g.separation_scale.to_string()),
        ]);

        let m = &self.macd_momentum;
        let section = macd_momentum::NAME;
        entries.extend([
            (section, "fast_period", m.fast_period.to_string()),
            (section, "slow_period", m.slow_period.to_string()),
            (section, "signal_period", m.signal_period.to_string()),
            (section, "atr_period", m.atr_period.to_string()),
            (section, "histogram_scale", m.histogram_scale.to_string()),
        ]);

        let p = &self.momentum_roc;
        let section = momentum_roc::NAME;
        entries.extend([
            (section, "roc_period", p.roc_period.to_string()),
            (section, "threshold_pct", p.threshold_pct.to_string()),
            (section, "volume_period", p.volume_period.to_string()),
            (section, "volume_mult", p.volume_mult.to_string()),
            (section, "trend_period", p.trend_period.to_string()),
            (section, "full_scale_pct", p.full_scale_pct.to_string()),
        ]);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_min_history_is_macd_lookback() {
        assert_eq!(EngineConfig::default().min_history(), 35);
    }

    #[test]
    fn strategies_follow_name_order() {
        let names: Vec<_> = EngineConfig::default()
            .strategies()
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(names, STRATEGY_NAMES);
    }

    #[test]
    fn min_history_tracks_parameters() {
        let mut config = EngineConfig::default();
        config.momentum_roc.volume_period = 50;
        assert_eq!(config.min_history(), 51);
    }

    #[test]
    fn missing_weight_reads_as_zero() {
        let mut config = EngineConfig::default();
        config.weights.remove(golden_cross::NAME);
        assert_eq!(config.weight(golden_cross::NAME), 0.0);
        assert_eq!(config.weight(macd_momentum::NAME), 1.0);
    }
}

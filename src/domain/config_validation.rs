//! Configuration parsing and validation.
//!
//! Builds an [`EngineConfig`] from a [`ConfigPort`], rejecting malformed or
//! out-of-range values up front so an engine is never constructed from a bad
//! configuration.

use crate::domain::combiner::Weights;
use crate::domain::config::{
    default_weights, DataSettings, EngineConfig, ReplaySettings, STRATEGY_NAMES,
};
use crate::domain::error::ConfluenceError;
use crate::domain::strategy::{
    golden_cross, macd_momentum, momentum_roc, rsi_mean_reversion, GoldenCrossParams,
    MacdMomentumParams, MomentumRocParams, RsiMeanReversionParams,
};
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;
use std::str::FromStr;

type Result<T> = std::result::Result<T, ConfluenceError>;

fn parse_value<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => {
            let raw = raw.trim();
            raw.parse().map_err(|_| {
                ConfluenceError::invalid(section, key, format!("'{}' is not a valid number", raw))
            })
        }
    }
}

fn read_f64(config: &dyn ConfigPort, section: &str, key: &str, default: f64) -> Result<f64> {
    let value: f64 = parse_value(config, section, key, default)?;
    if !value.is_finite() {
        return Err(ConfluenceError::invalid(section, key, "must be finite"));
    }
    Ok(value)
}

fn read_usize(config: &dyn ConfigPort, section: &str, key: &str, default: usize) -> Result<usize> {
    parse_value(config, section, key, default)
}

fn check_period(section: &str, key: &str, value: usize) -> Result<()> {
    if value < 1 {
        return Err(ConfluenceError::invalid(section, key, "period must be at least 1"));
    }
    Ok(())
}

fn check_positive(section: &str, key: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfluenceError::invalid(section, key, "must be positive"));
    }
    Ok(())
}

fn check_non_negative(section: &str, key: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(ConfluenceError::invalid(section, key, "must be non-negative"));
    }
    Ok(())
}

fn check_unit(section: &str, key: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfluenceError::invalid(section, key, "must be between 0 and 1"));
    }
    Ok(())
}

fn check_fast_below_slow(section: &str, fast: usize, slow: usize) -> Result<()> {
    if fast >= slow {
        return Err(ConfluenceError::invalid(
            section,
            "fast_period",
            format!("fast_period ({fast}) must be less than slow_period ({slow})"),
        ));
    }
    Ok(())
}

/// Parse `[engine]`, `[weights]` and the per-strategy sections, then validate.
pub fn build_engine_config(config: &dyn ConfigPort) -> Result<EngineConfig> {
    let defaults = EngineConfig::default();
    let engine = EngineConfig {
        weights: build_weights(config)?,
        rsi_mean_reversion: build_rsi_mean_reversion(config, &defaults.rsi_mean_reversion)?,
        golden_cross: build_golden_cross(config, &defaults.golden_cross)?,
        macd_momentum: build_macd_momentum(config, &defaults.macd_momentum)?,
        momentum_roc: build_momentum_roc(config, &defaults.momentum_roc)?,
        min_confidence: read_f64(config, "engine", "min_confidence", defaults.min_confidence)?,
        strong_score: read_f64(config, "engine", "strong_score", defaults.strong_score)?,
    };
    validate_engine_config(&engine)?;
    if engine.weights.values().all(|w| *w == 0.0) {
        tracing::warn!("all strategy weights are zero; every signal will be NEUTRAL");
    }
    Ok(engine)
}

/// Range checks shared by file-built and hand-built configurations.
pub fn validate_engine_config(engine: &EngineConfig) -> Result<()> {
    check_unit("engine", "min_confidence", engine.min_confidence)?;
    check_unit("engine", "strong_score", engine.strong_score)?;
    if engine.strong_score == 0.0 {
        return Err(ConfluenceError::invalid("engine", "strong_score", "must be positive"));
    }
    for (name, weight) in &engine.weights {
        if !STRATEGY_NAMES.contains(&name.as_str()) {
            return Err(ConfluenceError::invalid("weights", name, "unknown strategy"));
        }
        check_unit("weights", name, *weight)?;
    }
    validate_rsi_mean_reversion(&engine.rsi_mean_reversion)?;
    validate_golden_cross(&engine.golden_cross)?;
    validate_macd_momentum(&engine.macd_momentum)?;
    validate_momentum_roc(&engine.momentum_roc)
}

/// Without a `[weights]` section every strategy weighs 1. With one, listed
/// strategies take their value and unlisted ones weigh 0.
fn build_weights(config: &dyn ConfigPort) -> Result<Weights> {
    let Some(keys) = config.keys("weights") else {
        return Ok(default_weights());
    };
    if let Some(unknown) = keys.iter().find(|k| !STRATEGY_NAMES.contains(&k.as_str())) {
        return Err(ConfluenceError::invalid(
            "weights",
            unknown,
            format!("unknown strategy (expected one of {})", STRATEGY_NAMES.join(", ")),
        ));
    }
    STRATEGY_NAMES
        .iter()
        .map(|name| Ok((name.to_string(), read_f64(config, "weights", name, 0.0)?)))
        .collect()
}

fn build_rsi_mean_reversion(
    config: &dyn ConfigPort,
    d: &RsiMeanReversionParams,
) -> Result<RsiMeanReversionParams> {
    let section = rsi_mean_reversion::NAME;
    Ok(RsiMeanReversionParams {
        rsi_period: read_usize(config, section, "rsi_period", d.rsi_period)?,
        bb_period: read_usize(config, section, "bb_period", d.bb_period)?,
        bb_mult: read_f64(config, section, "bb_mult", d.bb_mult)?,
        oversold: read_f64(config, section, "oversold", d.oversold)?,
        overbought: read_f64(config, section, "overbought", d.overbought)?,
        exit_level: read_f64(config, section, "exit_level", d.exit_level)?,
    })
}

fn validate_rsi_mean_reversion(p: &RsiMeanReversionParams) -> Result<()> {
    let section = rsi_mean_reversion::NAME;
    check_period(section, "rsi_period", p.rsi_period)?;
    check_period(section, "bb_period", p.bb_period)?;
    check_positive(section, "bb_mult", p.bb_mult)?;
    if p.bb_mult_x100().is_none() {
        return Err(ConfluenceError::invalid(
            section,
            "bb_mult",
            "must be between 0.01 and 42949672.95",
        ));
    }
    if !(p.oversold > 0.0 && p.oversold < p.overbought && p.overbought < 100.0) {
        return Err(ConfluenceError::invalid(
            section,
            "oversold",
            "require 0 < oversold < overbought < 100",
        ));
    }
    if !(0.0..=100.0).contains(&p.exit_level) {
        return Err(ConfluenceError::invalid(section, "exit_level", "must be between 0 and 100"));
    }
    Ok(())
}

fn build_golden_cross(config: &dyn ConfigPort, d: &GoldenCrossParams) -> Result<GoldenCrossParams> {
    let section = golden_cross::NAME;
    Ok(GoldenCrossParams {
        fast_period: read_usize(config, section, "fast_period", d.fast_period)?,
        slow_period: read_usize(config, section, "slow_period", d.slow_period)?,
        separation_scale: read_f64(config, section, "separation_scale", d.separation_scale)?,
    })
}

fn validate_golden_cross(p: &GoldenCrossParams) -> Result<()> {
    let section = golden_cross::NAME;
    check_period(section, "fast_period", p.fast_period)?;
    check_period(section, "slow_period", p.slow_period)?;
    check_fast_below_slow(section, p.fast_period, p.slow_period)?;
    check_positive(section, "separation_scale", p.separation_scale)
}

fn build_macd_momentum(
    config: &dyn ConfigPort,
    d: &MacdMomentumParams,
) -> Result<MacdMomentumParams> {
    let section = macd_momentum::NAME;
    Ok(MacdMomentumParams {
        fast_period: read_usize(config, section, "fast_period", d.fast_period)?,
        slow_period: read_usize(config, section, "slow_period", d.slow_period)?,
        signal_period: read_usize(config, section, "signal_period", d.signal_period)?,
        atr_period: read_usize(config, section, "atr_period", d.atr_period)?,
        histogram_scale: read_f64(config, section, "histogram_scale", d.histogram_scale)?,
    })
}

fn validate_macd_momentum(p: &MacdMomentumParams) -> Result<()> {
    let section = macd_momentum::NAME;
    check_period(section, "fast_period", p.fast_period)?;
    check_period(section, "slow_period", p.slow_period)?;
    check_period(section, "signal_period", p.signal_period)?;
    check_period(section, "atr_period", p.atr_period)?;
    check_fast_below_slow(section, p.fast_period, p.slow_period)?;
    check_positive(section, "histogram_scale", p.histogram_scale)
}

fn build_momentum_roc(config: &dyn ConfigPort, d: &MomentumRocParams) -> Result<MomentumRocParams> {
    let section = momentum_roc::NAME;
    Ok(MomentumRocParams {
        roc_period: read_usize(config, section, "roc_period", d.roc_period)?,
        threshold_pct: read_f64(config, section, "threshold_pct", d.threshold_pct)?,
        volume_period: read_usize(config, section, "volume_period", d.volume_period)?,
        volume_mult: read_f64(config, section, "volume_mult", d.volume_mult)?,
        trend_period: read_usize(config, section, "trend_period", d.trend_period)?,
        full_scale_pct: read_f64(config, section, "full_scale_pct", d.full_scale_pct)?,
    })
}

fn validate_momentum_roc(p: &MomentumRocParams) -> Result<()> {
    let section = momentum_roc::NAME;
    check_period(section, "roc_period", p.roc_period)?;
    check_period(section, "volume_period", p.volume_period)?;
    check_period(section, "trend_period", p.trend_period)?;
    check_non_negative(section, "threshold_pct", p.threshold_pct)?;
    check_non_negative(section, "volume_mult", p.volume_mult)?;
    check_positive(section, "full_scale_pct", p.full_scale_pct)
}

/// Parse `[data]`. `path` is required; `symbols` is a comma-separated list.
pub fn build_data_settings(config: &dyn ConfigPort) -> Result<DataSettings> {
    let path = config
        .get_string("data", "path")
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ConfluenceError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        })?;
    let timeframe = config
        .get_string("data", "timeframe")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DataSettings::DEFAULT_TIMEFRAME.to_string());
    let symbols = config
        .get_string("data", "symbols")
        .map(|s| {
            s.split(',')
                .map(|sym| sym.trim().to_string())
                .filter(|sym| !sym.is_empty())
                .collect()
        })
        .unwrap_or_default();
    Ok(DataSettings {
        path: PathBuf::from(path.trim()),
        timeframe,
        symbols,
    })
}

/// Parse `[replay]` stop and target percentages.
pub fn build_replay_settings(config: &dyn ConfigPort) -> Result<ReplaySettings> {
    let defaults = ReplaySettings::default();
    let settings = ReplaySettings {
        stop_loss_pct: read_f64(config, "replay", "stop_loss_pct", defaults.stop_loss_pct)?,
        take_profit_pct: read_f64(config, "replay", "take_profit_pct", defaults.take_profit_pct)?,
    };
    check_positive("replay", "stop_loss_pct", settings.stop_loss_pct)?;
    check_positive("replay", "take_profit_pct", settings.take_profit_pct)?;
    Ok(settings)
}

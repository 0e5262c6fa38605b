//! Technical indicators.
//!
//! `IndicatorType` names an indicator with its parameters and keys every
//! lookup. Each indicator has a batch form (`calculate_*`, one
//! `IndicatorSeries` over a whole slice) and a rolling form in [`rolling`];
//! strategies read either through [`IndicatorSource`].

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod roc;
pub mod rolling;
pub mod rsi;
pub mod set;
pub mod sma;
pub mod stddev;

pub use atr::calculate_atr;
pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use roc::calculate_roc;
pub use rolling::RollingIndicators;
pub use rsi::calculate_rsi;
pub use set::{IndicatorSet, IndicatorSource};
pub use sma::{calculate_sma, calculate_volume_sma};
pub use stddev::calculate_stddev;

use crate::domain::ohlcv::PricePoint;
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: IndicatorValue,
}

impl IndicatorPoint {
    /// Placeholder for a bar inside the warmup window.
    pub fn warming(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            valid: false,
            value: IndicatorValue::Simple(0.0),
        }
    }

    pub fn simple(timestamp: NaiveDateTime, value: f64) -> Self {
        Self {
            timestamp,
            valid: true,
            value: IndicatorValue::Simple(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

impl IndicatorValue {
    pub fn as_simple(&self) -> Option<f64> {
        match self {
            IndicatorValue::Simple(v) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Roc(usize),
    Atr(usize),
    Stddev(usize),
    VolumeSma(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl IndicatorType {
    /// Bars needed before the first valid value.
    pub fn warmup(&self) -> usize {
        match self {
            IndicatorType::Sma(p)
            | IndicatorType::Ema(p)
            | IndicatorType::Atr(p)
            | IndicatorType::Stddev(p)
            | IndicatorType::VolumeSma(p) => *p,
            IndicatorType::Rsi(p) | IndicatorType::Roc(p) => p + 1,
            IndicatorType::Macd { slow, signal, .. } => slow + signal - 1,
            IndicatorType::Bollinger { period, .. } => *period,
        }
    }
}

/// Compute any indicator over `bars` in one pass.
pub fn calculate(bars: &[PricePoint], indicator: &IndicatorType) -> IndicatorSeries {
    match *indicator {
        IndicatorType::Sma(p) => calculate_sma(bars, p),
        IndicatorType::Ema(p) => calculate_ema(bars, p),
        IndicatorType::Rsi(p) => calculate_rsi(bars, p),
        IndicatorType::Roc(p) => calculate_roc(bars, p),
        IndicatorType::Atr(p) => calculate_atr(bars, p),
        IndicatorType::Stddev(p) => calculate_stddev(bars, p),
        IndicatorType::VolumeSma(p) => calculate_volume_sma(bars, p),
        IndicatorType::Macd { fast, slow, signal } => calculate_macd(bars, fast, slow, signal),
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(bars, period, stddev_mult_x100),
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Latest valid value, if the series has warmed up.
    pub fn latest(&self) -> Option<IndicatorValue> {
        self.values.last().filter(|p| p.valid).map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Roc(period) => write!(f, "ROC({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::VolumeSma(period) => write!(f, "VOLUME_SMA({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

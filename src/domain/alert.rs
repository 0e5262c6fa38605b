//! Human-readable alerts rendered from combined signals.

use crate::domain::signal::{CombinedSignal, Direction};
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSide {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl AlertSide {
    pub fn label(self) -> &'static str {
        match self {
            AlertSide::StrongBuy => "STRONG BUY",
            AlertSide::Buy => "BUY",
            AlertSide::Hold => "HOLD",
            AlertSide::Sell => "SELL",
            AlertSide::StrongSell => "STRONG SELL",
        }
    }

    fn classify(direction: Direction, score: f64, strong_score: f64) -> Self {
        let strong = score.abs() >= strong_score;
        match (direction, strong) {
            (Direction::Long, true) => AlertSide::StrongBuy,
            (Direction::Long, false) => AlertSide::Buy,
            (Direction::Short, true) => AlertSide::StrongSell,
            (Direction::Short, false) => AlertSide::Sell,
            (Direction::Neutral, _) => AlertSide::Hold,
        }
    }
}

impl fmt::Display for AlertSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    pub side: AlertSide,
    pub price: f64,
    pub confidence: f64,
    pub score: f64,
    /// Non-neutral strategies, in evaluation order.
    pub contributors: Vec<&'static str>,
    pub rsi: Option<f64>,
    pub fast_ema: Option<f64>,
    pub slow_ema: Option<f64>,
    pub macd: Option<f64>,
}

impl Alert {
    pub fn from_signal(signal: &CombinedSignal, strong_score: f64) -> Self {
        Self {
            symbol: signal.symbol.clone(),
            timestamp: signal.timestamp,
            side: AlertSide::classify(signal.direction, signal.score, strong_score),
            price: signal.price,
            confidence: signal.confidence,
            score: signal.score,
            contributors: signal
                .strategies
                .iter()
                .filter(|s| s.direction != Direction::Neutral)
                .map(|s| s.strategy)
                .collect(),
            rsi: signal.metric("rsi"),
            fast_ema: signal.metric("fast_ema"),
            slow_ema: signal.metric("slow_ema"),
            macd: signal.metric("macd"),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} @ {:.2} | confidence {:.0}% | score {:+.3}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.side,
            self.symbol,
            self.price,
            self.confidence * 100.0,
            self.score
        )?;
        if !self.contributors.is_empty() {
            write!(f, " | strategies: {}", self.contributors.join(", "))?;
        }
        if let Some(rsi) = self.rsi {
            write!(f, " | rsi {rsi:.1}")?;
        }
        if let (Some(fast), Some(slow)) = (self.fast_ema, self.slow_ema) {
            write!(f, " | ema {fast:.2}/{slow:.2}")?;
        }
        if let Some(macd) = self.macd {
            write!(f, " | macd {macd:.4}")?;
        }
        Ok(())
    }
}

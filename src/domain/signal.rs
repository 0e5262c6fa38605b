//! Directional signals produced by strategies and by the combiner.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Long,
    Short,
    Neutral,
}

impl Direction {
    /// LONG = +1, SHORT = -1, NEUTRAL = 0.
    pub fn score(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
            Direction::Neutral => 0.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
            Direction::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Supporting numbers reported with a signal, keyed by metric name.
pub type Metrics = BTreeMap<&'static str, f64>;

/// One strategy's verdict for the latest bar.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategySignal {
    pub strategy: &'static str,
    pub direction: Direction,
    pub confidence: f64,
    pub metrics: Metrics,
    pub reason: String,
    /// Advisory only: the strategy's exit condition holds on this bar.
    pub exit_advised: bool,
}

impl StrategySignal {
    pub fn new(
        strategy: &'static str,
        direction: Direction,
        confidence: f64,
        reason: impl Into<String>,
    ) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            strategy,
            direction,
            confidence: if direction == Direction::Neutral {
                0.0
            } else {
                confidence
            },
            metrics: Metrics::new(),
            reason: reason.into(),
            exit_advised: false,
        }
    }

    pub fn neutral(strategy: &'static str, reason: impl Into<String>) -> Self {
        Self::new(strategy, Direction::Neutral, 0.0, reason)
    }

    pub fn insufficient_history(strategy: &'static str, have: usize, need: usize) -> Self {
        Self::neutral(
            strategy,
            format!("insufficient history: have {have}, need {need}"),
        )
    }

    pub fn with_metric(mut self, name: &'static str, value: f64) -> Self {
        self.metrics.insert(name, value);
        self
    }

    pub fn with_exit(mut self, exit_advised: bool) -> Self {
        self.exit_advised = exit_advised;
        self
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Weighted aggregate of all strategy signals for one symbol and bar.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedSignal {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub direction: Direction,
    pub confidence: f64,
    /// Weighted signed score in [-1, 1]; its sign is the direction.
    pub score: f64,
    /// Per-strategy breakdown, in evaluation order.
    pub strategies: Vec<StrategySignal>,
}

impl CombinedSignal {
    pub fn strategy(&self, name: &str) -> Option<&StrategySignal> {
        self.strategies.iter().find(|s| s.strategy == name)
    }

    /// First value of `metric` reported by any strategy.
    pub fn metric(&self, metric: &str) -> Option<f64> {
        self.strategies.iter().find_map(|s| s.metric(metric))
    }
}

//! Actionability policy applied to a combined signal.

use crate::domain::signal::{CombinedSignal, Direction};
use std::fmt;

pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Actionable,
    Ignore,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Actionable => write!(f, "ACTIONABLE"),
            Verdict::Ignore => write!(f, "IGNORE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub verdict: Verdict,
    pub direction: Direction,
    pub confidence: f64,
    pub reason: String,
}

impl Decision {
    pub fn is_actionable(&self) -> bool {
        self.verdict == Verdict::Actionable
    }
}

/// ACTIONABLE iff the signal has a direction and clears `min_confidence`.
pub fn decide(signal: &CombinedSignal, min_confidence: f64) -> Decision {
    let (verdict, reason) = if signal.direction == Direction::Neutral {
        (Verdict::Ignore, "no directional consensus".to_string())
    } else if signal.confidence < min_confidence {
        (
            Verdict::Ignore,
            format!(
                "confidence {:.2} below threshold {:.2}",
                signal.confidence, min_confidence
            ),
        )
    } else {
        (
            Verdict::Actionable,
            format!(
                "{} with confidence {:.2} (threshold {:.2})",
                signal.direction, signal.confidence, min_confidence
            ),
        )
    };
    Decision {
        verdict,
        direction: signal.direction,
        confidence: signal.confidence,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::ts;

    fn combined(direction: Direction, confidence: f64) -> CombinedSignal {
        CombinedSignal {
            symbol: "BTC/USD".into(),
            timestamp: ts(0),
            price: 100.0,
            direction,
            confidence,
            score: direction.score() * confidence,
            strategies: Vec::new(),
        }
    }

    #[test]
    fn neutral_is_never_actionable() {
        let d = decide(&combined(Direction::Neutral, 0.9), 0.5);
        assert_eq!(d.verdict, Verdict::Ignore);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(decide(&combined(Direction::Long, 0.5), 0.5).is_actionable());
        assert!(!decide(&combined(Direction::Short, 0.49), 0.5).is_actionable());
    }

    #[test]
    fn decisions_are_repeatable() {
        let signal = combined(Direction::Short, 0.8);
        assert_eq!(decide(&signal, 0.5), decide(&signal, 0.5));
    }
}

//! Weighted combination of strategy signals.

use crate::domain::signal::{Direction, StrategySignal};
use std::collections::BTreeMap;

/// Strategy name to relative weight.
pub type Weights = BTreeMap<String, f64>;

/// Scores within this distance of zero count as a tie.
pub const TIE_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combination {
    pub direction: Direction,
    pub confidence: f64,
    pub score: f64,
}

impl Combination {
    pub const NEUTRAL: Combination = Combination {
        direction: Direction::Neutral,
        confidence: 0.0,
        score: 0.0,
    };
}

fn usable_weight(weights: &Weights, strategy: &str) -> Option<f64> {
    weights
        .get(strategy)
        .copied()
        .filter(|w| w.is_finite() && *w > 0.0)
}

/// Each participating signal with its weight renormalized over the
/// strategies present in `signals`. Strategies with no weight or a
/// non-positive weight are left out; empty when nothing participates.
pub fn normalized_weights<'a>(
    signals: &'a [StrategySignal],
    weights: &Weights,
) -> Vec<(&'a StrategySignal, f64)> {
    let present: Vec<_> = signals
        .iter()
        .filter_map(|s| usable_weight(weights, s.strategy).map(|w| (s, w)))
        .collect();
    let total: f64 = present.iter().map(|(_, w)| w).sum();
    if !(total > 0.0 && total.is_finite()) {
        return Vec::new();
    }
    present.into_iter().map(|(s, w)| (s, w / total)).collect()
}

/// Combine signals into one direction and confidence.
///
/// See [`normalized_weights`] for which strategies participate.
pub fn combine(signals: &[StrategySignal], weights: &Weights) -> Combination {
    let shares = normalized_weights(signals, weights);
    if shares.is_empty() {
        return Combination::NEUTRAL;
    }

    let mut score = 0.0;
    let mut confidence = 0.0;
    for (signal, w) in shares {
        score += w * signal.direction.score() * signal.confidence;
        confidence += w * signal.confidence;
    }

    let direction = if score > TIE_TOLERANCE {
        Direction::Long
    } else if score < -TIE_TOLERANCE {
        Direction::Short
    } else {
        Direction::Neutral
    };
    Combination {
        direction,
        confidence: confidence.clamp(0.0, 1.0),
        score: if direction == Direction::Neutral {
            0.0
        } else {
            score.clamp(-1.0, 1.0)
        },
    }
}

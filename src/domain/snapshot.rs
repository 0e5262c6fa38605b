//! Persisted engine state.

use crate::domain::config::EngineConfig;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Configuration plus the newest evaluated candle per symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub config: EngineConfig,
    pub last_evaluated: BTreeMap<String, NaiveDateTime>,
}

impl EngineSnapshot {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            last_evaluated: BTreeMap::new(),
        }
    }

    /// Whether a candle at `timestamp` was already evaluated for `symbol`.
    pub fn already_evaluated(&self, symbol: &str, timestamp: NaiveDateTime) -> bool {
        self.last_evaluated
            .get(symbol)
            .is_some_and(|last| timestamp <= *last)
    }

    /// Record `timestamp` for `symbol`, never moving backwards.
    pub fn record(&mut self, symbol: &str, timestamp: NaiveDateTime) {
        let entry = self
            .last_evaluated
            .entry(symbol.to_string())
            .or_insert(timestamp);
        if timestamp > *entry {
            *entry = timestamp;
        }
    }
}

//! Evaluation pipeline: indicators, strategies, combiner, decision.

use crate::domain::combiner::combine;
use crate::domain::config::EngineConfig;
use crate::domain::config_validation::validate_engine_config;
use crate::domain::decision::{decide, Decision};
use crate::domain::error::ConfluenceError;
use crate::domain::indicator::{IndicatorSet, IndicatorSource, IndicatorType, RollingIndicators};
use crate::domain::ohlcv::PricePoint;
use crate::domain::price_series::PriceSeries;
use crate::domain::signal::{CombinedSignal, StrategySignal};
use crate::domain::strategy::{Strategy, StrategyKind};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// Result of evaluating the latest bar of one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub signal: CombinedSignal,
    pub decision: Decision,
}

/// Stateless batch evaluator. Safe to share across threads.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: EngineConfig,
    strategies: Vec<StrategyKind>,
    indicators: Vec<IndicatorType>,
}

impl SignalEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfluenceError> {
        validate_engine_config(&config)?;
        let strategies = config.strategies();
        let mut indicators: Vec<IndicatorType> = Vec::new();
        for indicator in strategies.iter().flat_map(|s| s.required_indicators()) {
            if !indicators.contains(&indicator) {
                indicators.push(indicator);
            }
        }
        Ok(Self {
            config,
            strategies,
            indicators,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn strategies(&self) -> &[StrategyKind] {
        &self.strategies
    }

    /// Union of every strategy's indicators.
    pub fn required_indicators(&self) -> &[IndicatorType] {
        &self.indicators
    }

    pub fn min_history(&self) -> usize {
        self.config.min_history()
    }

    /// Evaluate the latest bar of `series`.
    ///
    /// Fails only on invalid candles or an empty series; short history
    /// produces a NEUTRAL result.
    pub fn evaluate(&self, series: &PriceSeries) -> Result<Evaluation, ConfluenceError> {
        series.validate()?;
        let indicators = IndicatorSet::compute(series.points(), &self.indicators);
        self.evaluate_with(series.symbol(), series.points(), &indicators)
    }

    /// Evaluate many symbols in parallel. Results keep the input order.
    pub fn evaluate_universe(
        &self,
        universe: &[PriceSeries],
    ) -> Vec<(String, Result<Evaluation, ConfluenceError>)> {
        universe
            .par_iter()
            .map(|series| (series.symbol().to_string(), self.evaluate(series)))
            .collect()
    }

    /// Run strategies, combiner and decision over already-computed indicators.
    pub(crate) fn evaluate_with(
        &self,
        symbol: &str,
        bars: &[PricePoint],
        indicators: &dyn IndicatorSource,
    ) -> Result<Evaluation, ConfluenceError> {
        let last = bars.last().ok_or_else(|| ConfluenceError::InvalidPriceData {
            symbol: symbol.to_string(),
            index: 0,
            reason: "series is empty".to_string(),
        })?;

        let signals: Vec<StrategySignal> = self
            .strategies
            .iter()
            .map(|s| s.evaluate(bars, indicators))
            .collect();
        let combination = combine(&signals, &self.config.weights);

        let signal = CombinedSignal {
            symbol: symbol.to_string(),
            timestamp: last.timestamp,
            price: last.close,
            direction: combination.direction,
            confidence: combination.confidence,
            score: combination.score,
            strategies: signals,
        };
        let decision = decide(&signal, self.config.min_confidence);

        tracing::debug!(
            symbol,
            timestamp = %signal.timestamp,
            bars = bars.len(),
            direction = %signal.direction,
            confidence = signal.confidence,
            score = signal.score,
            verdict = %decision.verdict,
            "evaluated"
        );
        Ok(Evaluation { signal, decision })
    }
}

struct LiveSymbol {
    series: PriceSeries,
    rolling: RollingIndicators,
}

/// Streaming evaluator: keeps an append-only series and rolling indicator
/// state per symbol, so each new candle costs one incremental update.
pub struct LiveEngine {
    engine: SignalEngine,
    timeframe: String,
    symbols: HashMap<String, LiveSymbol>,
}

impl LiveEngine {
    pub fn new(engine: SignalEngine, timeframe: impl Into<String>) -> Self {
        Self {
            engine,
            timeframe: timeframe.into(),
            symbols: HashMap::new(),
        }
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    fn state(&mut self, symbol: &str) -> &mut LiveSymbol {
        let engine = &self.engine;
        let timeframe = &self.timeframe;
        self.symbols
            .entry(symbol.to_string())
            .or_insert_with(|| LiveSymbol {
                series: PriceSeries::new(symbol, timeframe.as_str()),
                // Strategies look at most one bar back.
                rolling: RollingIndicators::new(engine.required_indicators(), 2),
            })
    }

    fn append(&mut self, symbol: &str, point: PricePoint) -> Result<(), ConfluenceError> {
        let state = self.state(symbol);
        if let Err(err) = state.series.check_next(&point) {
            tracing::warn!(symbol, error = %err, "rejected candle");
            return Err(err);
        }
        state.rolling.update(&point);
        state.series.push(point)
    }

    /// Append a candle without evaluating it.
    pub fn warm(&mut self, symbol: &str, point: PricePoint) -> Result<(), ConfluenceError> {
        self.append(symbol, point)
    }

    /// Append a candle and evaluate the symbol at it. A rejected candle is not
    /// appended and leaves the symbol's state untouched.
    pub fn ingest(
        &mut self,
        symbol: &str,
        point: PricePoint,
    ) -> Result<Evaluation, ConfluenceError> {
        self.append(symbol, point)?;
        let state = &self.symbols[symbol];
        self.engine
            .evaluate_with(symbol, state.series.points(), &state.rolling)
    }

    pub fn series(&self, symbol: &str) -> Option<&PriceSeries> {
        self.symbols.get(symbol).map(|s| &s.series)
    }

    /// Timestamp of the newest candle per symbol.
    pub fn last_timestamps(&self) -> BTreeMap<String, NaiveDateTime> {
        self.symbols
            .iter()
            .filter_map(|(symbol, s)| s.series.last().map(|p| (symbol.clone(), p.timestamp)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::decision::Verdict;
    use crate::domain::signal::Direction;
    use crate::domain::test_support::{bars_from_closes, bars_with_volume, ts};

    fn engine() -> SignalEngine {
        SignalEngine::new(EngineConfig::default()).unwrap()
    }

    fn wave(n: usize) -> Vec<PricePoint> {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 + 10.0 * (i as f64 / 7.0).sin() + 0.05 * i as f64)
            .collect();
        let volumes: Vec<f64> = (0..n).map(|i| 1000.0 + 300.0 * ((i % 5) as f64)).collect();
        bars_with_volume(&closes, &volumes)
    }

    #[test]
    fn short_history_is_neutral_not_an_error() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let series = PriceSeries::from_points("BTC-USDT", "1h", bars).unwrap();
        let eval = engine().evaluate(&series).unwrap();
        assert_eq!(eval.signal.direction, Direction::Neutral);
        assert_eq!(eval.signal.confidence, 0.0);
        assert_eq!(eval.decision.verdict, Verdict::Ignore);
        let macd = eval.signal.strategy("macd_momentum").unwrap();
        assert_eq!(macd.direction, Direction::Neutral);
        assert_eq!(macd.confidence, 0.0);
    }

    #[test]
    fn empty_series_is_rejected() {
        let series = PriceSeries::new("BTC-USDT", "1h");
        assert!(matches!(
            engine().evaluate(&series),
            Err(ConfluenceError::InvalidPriceData { .. })
        ));
    }

    #[test]
    fn invalid_series_is_rejected() {
        let mut bars = bars_from_closes(&[1.0, 2.0, 3.0]);
        bars[2].timestamp = bars[1].timestamp;
        let series = PriceSeries::from_points_unchecked("BTC-USDT", "1h", bars);
        let err = engine().evaluate(&series).unwrap_err();
        assert!(matches!(err, ConfluenceError::InvalidPriceData { index: 2, .. }));
    }

    #[test]
    fn signal_reports_latest_bar() {
        let bars = wave(60);
        let series = PriceSeries::from_points("ETH-USDT", "1h", bars.clone()).unwrap();
        let eval = engine().evaluate(&series).unwrap();
        assert_eq!(eval.signal.symbol, "ETH-USDT");
        assert_eq!(eval.signal.timestamp, ts(59));
        assert_eq!(eval.signal.price, bars[59].close);
        assert_eq!(eval.signal.strategies.len(), 4);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let mut config = EngineConfig::default();
        config.golden_cross.fast_period = 30;
        assert!(SignalEngine::new(config).unwrap_err().is_config_error());
    }

    #[test]
    fn universe_keeps_input_order() {
        let universe: Vec<PriceSeries> = ["A", "B", "C"]
            .iter()
            .map(|s| PriceSeries::from_points(*s, "1h", wave(40)).unwrap())
            .collect();
        let results = engine().evaluate_universe(&universe);
        let symbols: Vec<_> = results.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(symbols, ["A", "B", "C"]);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }

    #[test]
    fn live_matches_batch_at_every_bar() {
        let bars = wave(80);
        let batch = engine();
        let mut live = LiveEngine::new(engine(), "1h");
        for n in 1..=bars.len() {
            let streamed = live.ingest("SOL-USDT", bars[n - 1].clone()).unwrap();
            let series = PriceSeries::from_points("SOL-USDT", "1h", bars[..n].to_vec()).unwrap();
            let expected = batch.evaluate(&series).unwrap();
            assert_eq!(streamed.signal.direction, expected.signal.direction, "bar {n}");
            assert_eq!(streamed.decision.verdict, expected.decision.verdict, "bar {n}");
            assert!((streamed.signal.confidence - expected.signal.confidence).abs() < 1e-9);
        }
    }

    #[test]
    fn live_rejects_bad_candle_and_recovers() {
        let bars = wave(40);
        let mut live = LiveEngine::new(engine(), "1h");
        for bar in &bars[..39] {
            live.ingest("BTC-USDT", bar.clone()).unwrap();
        }
        let mut bad = bars[39].clone();
        bad.high = bad.low - 1.0;
        assert!(live.ingest("BTC-USDT", bad).is_err());
        assert_eq!(live.series("BTC-USDT").unwrap().len(), 39);

        let stale = bars[10].clone();
        assert!(live.ingest("BTC-USDT", stale).is_err());

        let eval = live.ingest("BTC-USDT", bars[39].clone()).unwrap();
        let series = PriceSeries::from_points("BTC-USDT", "1h", bars).unwrap();
        let expected = engine().evaluate(&series).unwrap();
        assert_eq!(eval.signal.direction, expected.signal.direction);
        assert!((eval.signal.confidence - expected.signal.confidence).abs() < 1e-9);
    }

    #[test]
    fn last_timestamps_track_each_symbol() {
        let mut live = LiveEngine::new(engine(), "1h");
        let bars = wave(3);
        live.warm("A", bars[0].clone()).unwrap();
        live.warm("B", bars[0].clone()).unwrap();
        live.warm("B", bars[1].clone()).unwrap();
        let stamps = live.last_timestamps();
        assert_eq!(stamps["A"], ts(0));
        assert_eq!(stamps["B"], ts(1));
    }
}

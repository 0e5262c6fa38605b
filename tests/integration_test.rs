//! End-to-end tests through the public engine API.

mod common;

use approx::assert_relative_eq;
use common::*;
use confluence::adapters::console_alert_adapter::ConsoleAlertAdapter;
use confluence::adapters::ini_snapshot_adapter::IniSnapshotAdapter;
use confluence::cli;
use confluence::domain::combiner::{combine, Weights};
use confluence::domain::config::{EngineConfig, ReplaySettings};
use confluence::domain::decision::Verdict;
use confluence::domain::engine::{LiveEngine, SignalEngine};
use confluence::domain::error::ConfluenceError;
use confluence::domain::price_series::PriceSeries;
use confluence::domain::replay::replay_series;
use confluence::domain::signal::{Direction, StrategySignal};
use confluence::domain::snapshot::EngineSnapshot;
use confluence::ports::data_port::DataPort;
use confluence::ports::snapshot_port::SnapshotPort;

fn default_engine() -> SignalEngine {
    SignalEngine::new(EngineConfig::default()).unwrap()
}

mod documented_scenarios {
    use super::*;

    #[test]
    fn decline_from_100_to_70_makes_rsi_strategy_long() {
        let series = make_series("BTC-USDT", &decline_100_to_70());
        assert_eq!(series.len(), 30);

        let eval = default_engine().evaluate(&series).unwrap();
        let rsi = eval.signal.strategy("rsi_mean_reversion").unwrap();
        assert_eq!(rsi.direction, Direction::Long);
        assert!(rsi.confidence > 0.0);
        assert!(rsi.metric("rsi").unwrap() < 30.0);
        assert!(series.last().unwrap().close <= rsi.metric("bb_lower").unwrap());
    }

    #[test]
    fn five_bars_leave_macd_neutral_but_evaluation_succeeds() {
        let series = make_series("ETH-USDT", &[100.0, 101.0, 102.0, 101.5, 103.0]);
        let eval = default_engine().evaluate(&series).unwrap();

        let macd = eval.signal.strategy("macd_momentum").unwrap();
        assert_eq!(macd.direction, Direction::Neutral);
        assert_eq!(macd.confidence, 0.0);
        assert!(macd.reason.contains("insufficient history"));
        assert_eq!(eval.signal.strategies.len(), 4);
        assert_eq!(eval.signal.timestamp, ts(4));
    }

    #[test]
    fn equal_weights_opposite_views_cancel() {
        let weights: Weights = [("a".to_string(), 0.5), ("b".to_string(), 0.5)]
            .into_iter()
            .collect();
        let signals = vec![
            StrategySignal::new("a", Direction::Long, 0.8, "up"),
            StrategySignal::new("b", Direction::Short, 0.8, "down"),
        ];
        let c = combine(&signals, &weights);
        assert_eq!(c.direction, Direction::Neutral);
        assert_relative_eq!(c.confidence, 0.8);
    }

    #[test]
    fn constant_prices_never_act() {
        let series = make_series("FLAT", &[50.0; 60]);
        let eval = default_engine().evaluate(&series).unwrap();
        assert_eq!(eval.signal.direction, Direction::Neutral);
        assert_eq!(eval.decision.verdict, Verdict::Ignore);
    }
}

mod universe {
    use super::*;

    #[test]
    fn evaluates_every_symbol_from_a_data_port() {
        let eth = PriceSeries::from_points("ETH-USDT", "1h", wave_bars(80, 2000.0)).unwrap();
        let port = MockDataPort::new()
            .with_series(make_series("BTC-USDT", &decline_100_to_70()))
            .with_series(eth)
            .with_series(make_series("SOL-USDT", &[20.0; 10]));

        let symbols = port.list_symbols("1h").unwrap();
        let universe: Vec<PriceSeries> = symbols
            .iter()
            .map(|s| port.fetch_series(s, "1h").unwrap())
            .collect();

        let results = default_engine().evaluate_universe(&universe);
        let names: Vec<&str> = results.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(names, ["BTC-USDT", "ETH-USDT", "SOL-USDT"]);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }

    #[test]
    fn one_bad_series_does_not_spoil_the_rest() {
        let mut points = wave_bars(40, 100.0);
        points[20].low = points[20].high + 1.0;
        let universe = vec![
            PriceSeries::from_points_unchecked("BAD", "1h", points),
            PriceSeries::from_points("GOOD", "1h", wave_bars(40, 100.0)).unwrap(),
        ];

        let results = default_engine().evaluate_universe(&universe);
        assert!(matches!(
            results[0].1,
            Err(ConfluenceError::InvalidPriceData { index: 20, .. })
        ));
        assert!(results[1].1.is_ok());
    }

    #[test]
    fn failing_symbol_is_dropped_and_the_rest_evaluated() {
        let port = MockDataPort::new()
            .with_series(make_series("BTC-USDT", &decline_100_to_70()))
            .with_series(make_series("ETH-USDT", &decline_100_to_70()))
            .failing("ETH-USDT");
        let symbols = vec!["BTC-USDT".to_string(), "ETH-USDT".to_string()];

        let (universe, failures) = cli::fetch_each(&port, &symbols, "1h");
        assert_eq!(universe.len(), 1);
        assert_eq!(universe[0].symbol(), "BTC-USDT");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "ETH-USDT");
        assert!(matches!(failures[0].1, ConfluenceError::Data { .. }));

        let results = default_engine().evaluate_universe(&universe);
        assert!(results[0].1.is_ok());
    }
}

mod streaming {
    use super::*;

    #[test]
    fn live_engine_matches_batch_across_interleaved_symbols() {
        let a = wave_bars(90, 100.0);
        let b = wave_bars(90, 3000.0);
        let engine = default_engine();
        let mut live = LiveEngine::new(engine.clone(), "1h");

        for n in 0..a.len() {
            for (symbol, points) in [("A", &a), ("B", &b)] {
                let streamed = live.ingest(symbol, points[n].clone()).unwrap();
                let batch = PriceSeries::from_points(symbol, "1h", points[..=n].to_vec()).unwrap();
                let expected = engine.evaluate(&batch).unwrap();
                let at = format!("{symbol} bar {n}");
                assert_eq!(streamed.signal.direction, expected.signal.direction, "{at}");
                assert_eq!(streamed.decision.verdict, expected.decision.verdict, "{at}");
                assert!(
                    (streamed.signal.score - expected.signal.score).abs() < 1e-9,
                    "{at}"
                );
            }
        }
    }

    #[test]
    fn rejected_candles_leave_state_intact() {
        let points = wave_bars(60, 100.0);
        let engine = default_engine();
        let mut live = LiveEngine::new(engine.clone(), "1h");
        for p in &points[..50] {
            live.ingest("X", p.clone()).unwrap();
        }

        let mut negative = points[50].clone();
        negative.close = -1.0;
        assert!(matches!(
            live.ingest("X", negative),
            Err(ConfluenceError::InvalidPriceData { .. })
        ));
        let duplicate = points[49].clone();
        assert!(live.ingest("X", duplicate).is_err());
        assert_eq!(live.series("X").unwrap().len(), 50);

        let mut last = None;
        for p in &points[50..] {
            last = Some(live.ingest("X", p.clone()).unwrap());
        }
        let expected = engine
            .evaluate(&PriceSeries::from_points("X", "1h", points.clone()).unwrap())
            .unwrap();
        let last = last.unwrap();
        assert_eq!(last.signal.direction, expected.signal.direction);
        assert!((last.signal.confidence - expected.signal.confidence).abs() < 1e-9);
    }
}

mod persistence {
    use super::*;

    #[test]
    fn snapshot_round_trips_configuration_and_progress() {
        let dir = tempfile::tempdir().unwrap();
        let port = IniSnapshotAdapter::new(dir.path().join("state.ini"));
        assert!(port.load().unwrap().is_none());

        let mut config = EngineConfig::default();
        config.min_confidence = 0.35;
        config.golden_cross.fast_period = 5;
        config.weights.insert("momentum_roc".to_string(), 0.0);
        let mut snapshot = EngineSnapshot::new(config.clone());
        snapshot.record("BTC-USDT", ts(41));

        port.save(&snapshot).unwrap();
        let loaded = port.load().unwrap().unwrap();
        assert_eq!(loaded.config, config);
        assert_eq!(loaded.last_evaluated["BTC-USDT"], ts(41));
    }

    #[test]
    fn resumed_replay_only_evaluates_new_candles() {
        let points = wave_bars(100, 100.0);
        let mut config = EngineConfig::default();
        config.min_confidence = 0.0;
        let settings = ReplaySettings::default();

        let first = PriceSeries::from_points("X", "1h", points[..70].to_vec()).unwrap();
        let mut snapshot = EngineSnapshot::new(config.clone());
        let mut sink = ConsoleAlertAdapter::new(Vec::new());
        let mut live = LiveEngine::new(SignalEngine::new(config.clone()).unwrap(), "1h");
        let summary =
            replay_series(&mut live, &first, &settings, &mut snapshot, &mut sink).unwrap();
        assert_eq!(summary.evaluated, 70);

        let dir = tempfile::tempdir().unwrap();
        let port = IniSnapshotAdapter::new(dir.path().join("state.ini"));
        port.save(&snapshot).unwrap();
        let mut resumed = port.load().unwrap().unwrap();

        let full = PriceSeries::from_points("X", "1h", points).unwrap();
        let mut live = LiveEngine::new(SignalEngine::new(resumed.config.clone()).unwrap(), "1h");
        let summary = replay_series(&mut live, &full, &settings, &mut resumed, &mut sink).unwrap();
        assert_eq!(summary.warmed, 70);
        assert_eq!(summary.evaluated, 30);
        assert_eq!(resumed.last_evaluated["X"], ts(99));
    }

    #[test]
    fn resume_with_fractional_timestamps_evaluates_nothing_twice() {
        let points: Vec<_> = wave_bars(50, 100.0)
            .into_iter()
            .map(|mut p| {
                p.timestamp += chrono::Duration::milliseconds(500);
                p
            })
            .collect();
        let series = PriceSeries::from_points("X", "1h", points).unwrap();
        let config = EngineConfig::default();
        let settings = ReplaySettings::default();
        let mut sink = ConsoleAlertAdapter::new(Vec::new());

        let mut snapshot = EngineSnapshot::new(config.clone());
        let mut live = LiveEngine::new(SignalEngine::new(config).unwrap(), "1h");
        replay_series(&mut live, &series, &settings, &mut snapshot, &mut sink).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let port = IniSnapshotAdapter::new(dir.path().join("state.ini"));
        port.save(&snapshot).unwrap();
        let mut resumed = port.load().unwrap().unwrap();

        let engine = SignalEngine::new(resumed.config.clone()).unwrap();
        let mut live = LiveEngine::new(engine, "1h");
        let summary =
            replay_series(&mut live, &series, &settings, &mut resumed, &mut sink).unwrap();
        assert_eq!(summary.warmed, 50);
        assert_eq!(summary.evaluated, 0);
        assert_eq!(summary.alerts, 0);
    }
}

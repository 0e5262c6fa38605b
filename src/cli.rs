//! CLI definition and dispatch.

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::console_alert_adapter::ConsoleAlertAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::ini_snapshot_adapter::IniSnapshotAdapter;
use crate::domain::alert::Alert;
use crate::domain::config::{DataSettings, STRATEGY_NAMES};
use crate::domain::config_validation::{
    build_data_settings, build_engine_config, build_replay_settings,
};
use crate::domain::engine::{Evaluation, LiveEngine, SignalEngine};
use crate::domain::error::ConfluenceError;
use crate::domain::price_series::PriceSeries;
use crate::domain::replay::{replay_series, ReplaySummary};
use crate::domain::snapshot::EngineSnapshot;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::snapshot_port::SnapshotPort;

#[derive(Parser, Debug)]
#[command(name = "confluence", about = "Multi-strategy trading signal engine")]
pub struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate the latest candle of each symbol
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,
        /// Symbols to evaluate (default: [data] symbols, else every file)
        #[arg(short, long)]
        symbol: Vec<String>,
        #[arg(short, long)]
        timeframe: Option<String>,
        /// Print the per-strategy breakdown
        #[arg(long)]
        detail: bool,
    },
    /// Replay stored candles through the streaming engine
    Replay {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: Vec<String>,
        #[arg(short, long)]
        timeframe: Option<String>,
        /// Snapshot file to resume from and update
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols with candle files for a timeframe
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        timeframe: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Evaluate {
            config,
            symbol,
            timeframe,
            detail,
        } => run_evaluate(&config, &symbol, timeframe.as_deref(), detail),
        Command::Replay {
            config,
            symbol,
            timeframe,
            state,
        } => run_replay(&config, &symbol, timeframe.as_deref(), state.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config, timeframe } => {
            run_list_symbols(&config, timeframe.as_deref())
        }
    }
}

fn fail(err: &ConfluenceError) -> ExitCode {
    tracing::error!(error = %err, "command failed");
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    tracing::info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

/// Apply command-line overrides to `[data]`.
fn resolve_data(
    config: &FileConfigAdapter,
    symbols: &[String],
    timeframe: Option<&str>,
) -> Result<DataSettings, ConfluenceError> {
    let mut data = build_data_settings(config)?;
    if let Some(tf) = timeframe {
        data.timeframe = tf.to_string();
    }
    if !symbols.is_empty() {
        data.symbols = symbols.to_vec();
    }
    Ok(data)
}

fn resolve_symbols(
    port: &dyn DataPort,
    data: &DataSettings,
) -> Result<Vec<String>, ConfluenceError> {
    if !data.symbols.is_empty() {
        return Ok(data.symbols.clone());
    }
    let symbols = port.list_symbols(&data.timeframe)?;
    if symbols.is_empty() {
        return Err(ConfluenceError::Data {
            reason: format!(
                "no {} candle files in {}",
                data.timeframe,
                data.path.display()
            ),
        });
    }
    Ok(symbols)
}

fn run_evaluate(
    config_path: &Path,
    symbols: &[String],
    timeframe: Option<&str>,
    detail: bool,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let (engine, universe, failures) = match load_universe(&config, symbols, timeframe) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    let mut exit = report_failures(&failures);
    for (symbol, outcome) in engine.evaluate_universe(&universe) {
        match outcome {
            Ok(evaluation) => print_evaluation(&evaluation, engine.config().strong_score, detail),
            Err(e) => {
                eprintln!("error: {symbol}: {e}");
                exit = (&e).into();
            }
        }
    }
    exit
}

/// Symbols whose candles could not be loaded, with the reason.
pub type Failures = Vec<(String, ConfluenceError)>;

/// Print per-symbol failures; the exit code of the last one, or success.
fn report_failures(failures: &Failures) -> ExitCode {
    let mut exit = ExitCode::SUCCESS;
    for (symbol, err) in failures {
        tracing::warn!(symbol = %symbol, error = %err, "skipping symbol");
        eprintln!("error: {symbol}: {err}");
        exit = err.into();
    }
    exit
}

/// Fetch every symbol on its own; a bad file only drops that symbol.
pub fn fetch_each(
    port: &dyn DataPort,
    symbols: &[String],
    timeframe: &str,
) -> (Vec<PriceSeries>, Failures) {
    let mut universe = Vec::with_capacity(symbols.len());
    let mut failures = Vec::new();
    for symbol in symbols {
        match port.fetch_series(symbol, timeframe) {
            Ok(series) => universe.push(series),
            Err(e) => failures.push((symbol.clone(), e)),
        }
    }
    (universe, failures)
}

fn load_universe(
    config: &FileConfigAdapter,
    symbols: &[String],
    timeframe: Option<&str>,
) -> Result<(SignalEngine, Vec<PriceSeries>, Failures), ConfluenceError> {
    let engine = SignalEngine::new(build_engine_config(config)?)?;
    let data = resolve_data(config, symbols, timeframe)?;
    let port = CsvAdapter::new(data.path.clone());
    let symbols = resolve_symbols(&port, &data)?;

    let (universe, failures) = fetch_each(&port, &symbols, &data.timeframe);
    tracing::info!(
        symbols = universe.len(),
        failed = failures.len(),
        timeframe = %data.timeframe,
        "evaluating"
    );
    Ok((engine, universe, failures))
}

fn print_evaluation(evaluation: &Evaluation, strong_score: f64, detail: bool) {
    let alert = Alert::from_signal(&evaluation.signal, strong_score);
    println!("{alert}");
    println!(
        "  decision: {} ({})",
        evaluation.decision.verdict, evaluation.decision.reason
    );
    if detail {
        for s in &evaluation.signal.strategies {
            let exit = if s.exit_advised { " [exit advised]" } else { "" };
            println!(
                "  {:<20} {:<7} {:.2}  {}{}",
                s.strategy, s.direction, s.confidence, s.reason, exit
            );
        }
    }
}

fn run_replay(
    config_path: &Path,
    symbols: &[String],
    timeframe: Option<&str>,
    state_path: Option<&Path>,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let snapshot_port = state_path.map(|p| IniSnapshotAdapter::new(p.to_path_buf()));

    match replay_all(&config, symbols, timeframe, snapshot_port.as_ref()) {
        Ok((summaries, failures)) => {
            for summary in &summaries {
                print_summary(summary);
            }
            report_failures(&failures)
        }
        Err(e) => fail(&e),
    }
}

fn replay_all(
    config: &FileConfigAdapter,
    symbols: &[String],
    timeframe: Option<&str>,
    snapshot_port: Option<&IniSnapshotAdapter>,
) -> Result<(Vec<ReplaySummary>, Failures), ConfluenceError> {
    let settings = build_replay_settings(config)?;
    let data = resolve_data(config, symbols, timeframe)?;

    // A saved snapshot's configuration wins over the config file's.
    let mut snapshot = match snapshot_port.map(|p| p.load()).transpose()?.flatten() {
        Some(snapshot) => {
            tracing::info!(symbols = snapshot.last_evaluated.len(), "resuming from snapshot");
            snapshot
        }
        None => EngineSnapshot::new(build_engine_config(config)?),
    };

    let engine = SignalEngine::new(snapshot.config.clone())?;
    let mut live = LiveEngine::new(engine, data.timeframe.clone());
    let port = CsvAdapter::new(data.path.clone());
    let mut alerts = ConsoleAlertAdapter::stdout();

    let symbols = resolve_symbols(&port, &data)?;
    let (universe, mut failures) = fetch_each(&port, &symbols, &data.timeframe);
    let mut summaries = Vec::with_capacity(universe.len());
    for series in &universe {
        match replay_series(&mut live, series, &settings, &mut snapshot, &mut alerts) {
            Ok(summary) => summaries.push(summary),
            Err(e) => failures.push((series.symbol().to_string(), e)),
        }
    }

    // Progress on the symbols that did replay is kept even if others failed.
    if let Some(port) = snapshot_port {
        port.save(&snapshot)?;
    }
    Ok((summaries, failures))
}

fn print_summary(summary: &ReplaySummary) {
    let closed = summary.closed_trades().count();
    println!(
        "{}: {} evaluated, {} warmed, {} rejected, {} alerts, {} trades, \
         {:.1}% win rate, {:+.2}% total",
        summary.symbol,
        summary.evaluated,
        summary.warmed,
        summary.rejected,
        summary.alerts,
        closed,
        summary.win_rate() * 100.0,
        summary.total_return_pct()
    );
}

fn run_validate(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let engine = match build_engine_config(&config).and_then(SignalEngine::new) {
        Ok(e) => e,
        Err(e) => return fail(&e),
    };
    if let Err(e) = build_replay_settings(&config) {
        return fail(&e);
    }
    let data = if config.keys("data").is_some() {
        match build_data_settings(&config) {
            Ok(d) => Some(d),
            Err(e) => return fail(&e),
        }
    } else {
        None
    };

    let cfg = engine.config();
    println!("Configuration is valid.");
    println!(
        "  min_confidence: {}  strong_score: {}",
        cfg.min_confidence, cfg.strong_score
    );
    println!("  weights:");
    for name in STRATEGY_NAMES {
        println!("    {:<20} {}", name, cfg.weight(name));
    }
    println!("  min history: {} bars", engine.min_history());
    let mut indicators: Vec<String> = engine
        .required_indicators()
        .iter()
        .map(|i| i.to_string())
        .collect();
    indicators.sort();
    println!("  indicators: {}", indicators.join(", "));
    if let Some(data) = data {
        println!("  data: {} ({})", data.path.display(), data.timeframe);
    }
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &Path, timeframe: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data = match resolve_data(&config, &[], timeframe) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    let symbols = match CsvAdapter::new(data.path.clone()).list_symbols(&data.timeframe) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found for timeframe {}", data.timeframe);
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

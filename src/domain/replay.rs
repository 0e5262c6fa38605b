//! Historical replay: feeds stored candles through a [`LiveEngine`] one at a
//! time, the way a live consumer would see them.
//!
//! The driver owns the consumer side: it opens and closes [`TradeState`]s on
//! actionable direction changes and protective exits, and sends an alert each
//! time the actionable direction changes.

use crate::domain::alert::Alert;
use crate::domain::config::ReplaySettings;
use crate::domain::engine::LiveEngine;
use crate::domain::error::ConfluenceError;
use crate::domain::position::{ExitReason, Side, TradeState};
use crate::domain::price_series::PriceSeries;
use crate::domain::signal::Direction;
use crate::domain::snapshot::EngineSnapshot;
use crate::ports::alert_port::AlertPort;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReplaySummary {
    pub symbol: String,
    /// Candles already covered by the snapshot; used only to warm state.
    pub warmed: usize,
    pub evaluated: usize,
    pub rejected: usize,
    pub actionable: usize,
    pub alerts: usize,
    pub trades: Vec<TradeState>,
}

impl ReplaySummary {
    pub fn closed_trades(&self) -> impl Iterator<Item = &TradeState> {
        self.trades.iter().filter(|t| !t.is_open())
    }

    pub fn wins(&self) -> usize {
        self.closed_trades()
            .filter(|t| t.realized_return_pct().is_some_and(|r| r > 0.0))
            .count()
    }

    pub fn win_rate(&self) -> f64 {
        let closed = self.closed_trades().count();
        if closed == 0 {
            0.0
        } else {
            self.wins() as f64 / closed as f64
        }
    }

    /// Sum of realized percentage returns.
    pub fn total_return_pct(&self) -> f64 {
        self.closed_trades()
            .filter_map(|t| t.realized_return_pct())
            .sum()
    }
}

/// Replay `series` through `live`, skipping evaluation of candles the
/// snapshot already covers and recording progress into it.
///
/// Invalid candles are counted and skipped. Only alert sink failures abort.
pub fn replay_series(
    live: &mut LiveEngine,
    series: &PriceSeries,
    settings: &ReplaySettings,
    snapshot: &mut EngineSnapshot,
    alerts: &mut dyn AlertPort,
) -> Result<ReplaySummary, ConfluenceError> {
    let symbol = series.symbol();
    let strong_score = live.engine().config().strong_score;
    let mut summary = ReplaySummary {
        symbol: symbol.to_string(),
        ..ReplaySummary::default()
    };
    let mut open: Option<TradeState> = None;
    let mut alerted = Direction::Neutral;

    for point in series.points() {
        if snapshot.already_evaluated(symbol, point.timestamp) {
            match live.warm(symbol, point.clone()) {
                Ok(()) => summary.warmed += 1,
                Err(_) => summary.rejected += 1,
            }
            continue;
        }

        let evaluation = match live.ingest(symbol, point.clone()) {
            Ok(e) => e,
            Err(ConfluenceError::InvalidPriceData { .. }) => {
                summary.rejected += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        snapshot.record(symbol, point.timestamp);
        summary.evaluated += 1;

        let price = point.close;
        if let Some(trade) = open.as_mut() {
            if let Some(reason) = trade.protective_exit(price) {
                trade.close(price, point.timestamp, reason);
            }
        }

        if !evaluation.decision.is_actionable() {
            close_finished(&mut open, &mut summary);
            continue;
        }
        summary.actionable += 1;
        let direction = evaluation.decision.direction;

        if let Some(trade) = open.as_mut() {
            if trade.is_open() && trade.side.direction() != direction {
                trade.close(price, point.timestamp, ExitReason::Reversal);
            }
        }
        close_finished(&mut open, &mut summary);

        if open.is_none() {
            if let Some(side) = Side::from_direction(direction) {
                tracing::debug!(symbol, %direction, price, "opening trade");
                open = Some(TradeState::open(
                    symbol,
                    side,
                    price,
                    point.timestamp,
                    settings.stop_loss_pct,
                    settings.take_profit_pct,
                ));
            }
        }

        if direction != alerted {
            alerts.send(&Alert::from_signal(&evaluation.signal, strong_score))?;
            summary.alerts += 1;
            alerted = direction;
        }
    }

    if let Some(mut trade) = open.take() {
        if let (true, Some(last)) = (trade.is_open(), series.last()) {
            trade.close(last.close, last.timestamp, ExitReason::EndOfData);
        }
        summary.trades.push(trade);
    }

    tracing::info!(
        symbol,
        evaluated = summary.evaluated,
        warmed = summary.warmed,
        rejected = summary.rejected,
        trades = summary.trades.len(),
        "replay finished"
    );
    Ok(summary)
}

fn close_finished(open: &mut Option<TradeState>, summary: &mut ReplaySummary) {
    if open.as_ref().is_some_and(|t| !t.is_open()) {
        if let Some(trade) = open.take() {
            summary.trades.push(trade);
        }
    }
}

//! Consumer-side trade tracking.
//!
//! The engine never reads or writes a [`TradeState`]; the replay driver owns
//! one per symbol and moves it from OPEN to CLOSED.

use crate::domain::signal::Direction;
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn from_direction(direction: Direction) -> Option<Side> {
        match direction {
            Direction::Long => Some(Side::Long),
            Direction::Short => Some(Side::Short),
            Direction::Neutral => None,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Side::Long => Direction::Long,
            Side::Short => Direction::Short,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    Reversal,
    EndOfData,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "stop-loss"),
            ExitReason::TakeProfit => write!(f, "take-profit"),
            ExitReason::Reversal => write!(f, "reversal"),
            ExitReason::EndOfData => write!(f, "end of data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeState {
    pub symbol: String,
    pub side: Side,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub status: TradeStatus,
    pub exit: Option<TradeExit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeExit {
    pub price: f64,
    pub time: NaiveDateTime,
    pub reason: ExitReason,
}

impl TradeState {
    /// Open a trade with stop and target placed `stop_loss_pct` and
    /// `take_profit_pct` percent away from the entry.
    pub fn open(
        symbol: impl Into<String>,
        side: Side,
        entry_price: f64,
        entry_time: NaiveDateTime,
        stop_loss_pct: f64,
        take_profit_pct: f64,
    ) -> Self {
        let (stop_loss, take_profit) = match side {
            Side::Long => (
                entry_price * (1.0 - stop_loss_pct / 100.0),
                entry_price * (1.0 + take_profit_pct / 100.0),
            ),
            Side::Short => (
                entry_price * (1.0 + stop_loss_pct / 100.0),
                entry_price * (1.0 - take_profit_pct / 100.0),
            ),
        };
        Self {
            symbol: symbol.into(),
            side,
            entry_price,
            entry_time,
            stop_loss,
            take_profit,
            status: TradeStatus::Open,
            exit: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        match self.side {
            Side::Long => price <= self.stop_loss,
            Side::Short => price >= self.stop_loss,
        }
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        match self.side {
            Side::Long => price >= self.take_profit,
            Side::Short => price <= self.take_profit,
        }
    }

    /// Protective exit triggered at `price`, stop-loss first.
    pub fn protective_exit(&self, price: f64) -> Option<ExitReason> {
        if !self.is_open() {
            None
        } else if self.should_stop_loss(price) {
            Some(ExitReason::StopLoss)
        } else if self.should_take_profit(price) {
            Some(ExitReason::TakeProfit)
        } else {
            None
        }
    }

    pub fn close(&mut self, price: f64, time: NaiveDateTime, reason: ExitReason) {
        self.status = TradeStatus::Closed;
        self.exit = Some(TradeExit {
            price,
            time,
            reason,
        });
    }

    /// Percentage return at `price`, signed by side.
    pub fn return_pct_at(&self, price: f64) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        let change = (price - self.entry_price) / self.entry_price * 100.0;
        match self.side {
            Side::Long => change,
            Side::Short => -change,
        }
    }

    /// Realized return; `None` while open.
    pub fn realized_return_pct(&self) -> Option<f64> {
        self.exit.as_ref().map(|e| self.return_pct_at(e.price))
    }
}

//! Incremental indicator state.
//!
//! Each state consumes one candle at a time and reproduces, bar for bar, the
//! value and validity of the matching `calculate_*` function. A live symbol
//! therefore costs O(window) per new candle instead of a full recompute.

use crate::domain::indicator::bollinger::bands;
use crate::domain::indicator::roc::rate_of_change;
use crate::domain::indicator::rsi::{gain_loss, rsi_from_averages};
use crate::domain::indicator::stddev::mean_and_stddev;
use crate::domain::indicator::{IndicatorSource, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PricePoint;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone)]
struct EmaState {
    period: usize,
    k: f64,
    count: usize,
    sum: f64,
    ema: f64,
}

impl EmaState {
    fn new(period: usize) -> Self {
        Self {
            period,
            k: 2.0 / (period as f64 + 1.0),
            count: 0,
            sum: 0.0,
            ema: 0.0,
        }
    }

    fn update(&mut self, close: f64) -> Option<f64> {
        if self.period == 0 {
            return None;
        }
        self.count += 1;
        if self.count < self.period {
            self.sum += close;
            None
        } else if self.count == self.period {
            self.sum += close;
            self.ema = self.sum / self.period as f64;
            Some(self.ema)
        } else {
            self.ema = close * self.k + self.ema * (1.0 - self.k);
            Some(self.ema)
        }
    }
}

#[derive(Debug, Clone)]
struct RsiState {
    period: usize,
    prev_close: Option<f64>,
    changes: usize,
    gain_sum: f64,
    loss_sum: f64,
    avg_gain: f64,
    avg_loss: f64,
}

impl RsiState {
    fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            changes: 0,
            gain_sum: 0.0,
            loss_sum: 0.0,
            avg_gain: 0.0,
            avg_loss: 0.0,
        }
    }

    fn update(&mut self, close: f64) -> Option<f64> {
        let prev = self.prev_close.replace(close)?;
        if self.period == 0 {
            return None;
        }
        let (gain, loss) = gain_loss(close - prev);
        let n = self.period as f64;

        self.changes += 1;
        if self.changes < self.period {
            self.gain_sum += gain;
            self.loss_sum += loss;
            None
        } else if self.changes == self.period {
            self.gain_sum += gain;
            self.loss_sum += loss;
            self.avg_gain = self.gain_sum / n;
            self.avg_loss = self.loss_sum / n;
            Some(rsi_from_averages(self.avg_gain, self.avg_loss))
        } else {
            self.avg_gain = (self.avg_gain * (self.period - 1) as f64 + gain) / n;
            self.avg_loss = (self.avg_loss * (self.period - 1) as f64 + loss) / n;
            Some(rsi_from_averages(self.avg_gain, self.avg_loss))
        }
    }
}

#[derive(Debug, Clone)]
struct AtrState {
    period: usize,
    prev_close: Option<f64>,
    count: usize,
    tr_sum: f64,
    atr: f64,
}

impl AtrState {
    fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            count: 0,
            tr_sum: 0.0,
            atr: 0.0,
        }
    }

    fn update(&mut self, bar: &PricePoint) -> Option<f64> {
        let tr = match self.prev_close.replace(bar.close) {
            Some(prev_close) => bar.true_range(prev_close),
            None => bar.high - bar.low,
        };
        if self.period == 0 {
            return None;
        }
        self.count += 1;
        if self.count < self.period {
            self.tr_sum += tr;
            None
        } else if self.count == self.period {
            self.tr_sum += tr;
            self.atr = self.tr_sum / self.period as f64;
            Some(self.atr)
        } else {
            self.atr = (self.atr * (self.period - 1) as f64 + tr) / self.period as f64;
            Some(self.atr)
        }
    }
}

#[derive(Debug, Clone)]
struct MacdState {
    fast: EmaState,
    slow: EmaState,
    signal_period: usize,
    k: f64,
    lines: usize,
    sum: f64,
    signal_ema: f64,
}

impl MacdState {
    fn new(fast: usize, slow: usize, signal_period: usize) -> Self {
        Self {
            fast: EmaState::new(fast),
            slow: EmaState::new(slow),
            signal_period,
            k: 2.0 / (signal_period as f64 + 1.0),
            lines: 0,
            sum: 0.0,
            signal_ema: 0.0,
        }
    }

    fn update(&mut self, close: f64) -> Option<IndicatorValue> {
        let fast = self.fast.update(close);
        let slow = self.slow.update(close);
        let line = fast? - slow?;
        if self.signal_period == 0 {
            return None;
        }

        self.lines += 1;
        if self.lines < self.signal_period {
            self.sum += line;
            return None;
        } else if self.lines == self.signal_period {
            self.sum += line;
            self.signal_ema = self.sum / self.signal_period as f64;
        } else {
            self.signal_ema = line * self.k + self.signal_ema * (1.0 - self.k);
        }

        Some(IndicatorValue::Macd {
            line,
            signal: self.signal_ema,
            histogram: line - self.signal_ema,
        })
    }
}

/// Fixed-length window over the most recent values.
#[derive(Debug, Clone)]
struct Window {
    period: usize,
    values: VecDeque<f64>,
}

impl Window {
    fn new(period: usize) -> Self {
        Self {
            period,
            values: VecDeque::with_capacity(period + 1),
        }
    }

    /// Push a value; true once the window holds exactly `period` values.
    fn push(&mut self, value: f64) -> bool {
        self.values.push_back(value);
        if self.values.len() > self.period {
            self.values.pop_front();
        }
        self.period > 0 && self.values.len() == self.period
    }

    fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.period as f64
    }

    fn mean_and_stddev(&self) -> (f64, f64) {
        mean_and_stddev(self.values.iter().copied(), self.period)
    }
}

#[derive(Debug, Clone)]
enum RollingState {
    Sma(Window),
    VolumeSma(Window),
    Stddev(Window),
    Bollinger { window: Window, mult_x100: u32 },
    Ema(EmaState),
    Rsi(RsiState),
    Roc(Window),
    Atr(AtrState),
    Macd(MacdState),
}

impl RollingState {
    fn new(indicator: &IndicatorType) -> Self {
        match *indicator {
            IndicatorType::Sma(p) => RollingState::Sma(Window::new(p)),
            IndicatorType::VolumeSma(p) => RollingState::VolumeSma(Window::new(p)),
            IndicatorType::Stddev(p) => RollingState::Stddev(Window::new(p)),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => RollingState::Bollinger {
                window: Window::new(period),
                mult_x100: stddev_mult_x100,
            },
            IndicatorType::Ema(p) => RollingState::Ema(EmaState::new(p)),
            IndicatorType::Rsi(p) => RollingState::Rsi(RsiState::new(p)),
            // n + 1 closes: the current one and the one n bars back
            IndicatorType::Roc(p) => RollingState::Roc(Window::new(if p == 0 { 0 } else { p + 1 })),
            IndicatorType::Atr(p) => RollingState::Atr(AtrState::new(p)),
            IndicatorType::Macd { fast, slow, signal } => {
                RollingState::Macd(MacdState::new(fast, slow, signal))
            }
        }
    }

    fn update(&mut self, bar: &PricePoint) -> Option<IndicatorValue> {
        match self {
            RollingState::Sma(w) => w.push(bar.close).then(|| IndicatorValue::Simple(w.mean())),
            RollingState::VolumeSma(w) => {
                w.push(bar.volume).then(|| IndicatorValue::Simple(w.mean()))
            }
            RollingState::Stddev(w) => w
                .push(bar.close)
                .then(|| IndicatorValue::Simple(w.mean_and_stddev().1)),
            RollingState::Bollinger { window, mult_x100 } => window.push(bar.close).then(|| {
                let (middle, stddev) = window.mean_and_stddev();
                bands(middle, stddev, *mult_x100)
            }),
            RollingState::Ema(s) => s.update(bar.close).map(IndicatorValue::Simple),
            RollingState::Rsi(s) => s.update(bar.close).map(IndicatorValue::Simple),
            RollingState::Roc(w) => w.push(bar.close).then(|| {
                let base = w.values.front().copied().unwrap_or(0.0);
                IndicatorValue::Simple(rate_of_change(base, bar.close))
            }),
            RollingState::Atr(s) => s.update(bar).map(IndicatorValue::Simple),
            RollingState::Macd(s) => s.update(bar.close),
        }
    }
}

#[derive(Debug, Clone)]
struct Tracked {
    state: RollingState,
    history: VecDeque<Option<IndicatorValue>>,
}

/// Rolling indicator state for one symbol, keeping the last `depth` outputs of
/// each tracked indicator.
#[derive(Debug, Clone)]
pub struct RollingIndicators {
    tracked: HashMap<IndicatorType, Tracked>,
    depth: usize,
    bars_seen: usize,
}

impl RollingIndicators {
    pub fn new(indicators: &[IndicatorType], depth: usize) -> Self {
        let depth = depth.max(1);
        let mut tracked = HashMap::with_capacity(indicators.len());
        for indicator in indicators {
            tracked.entry(indicator.clone()).or_insert_with(|| Tracked {
                state: RollingState::new(indicator),
                history: VecDeque::with_capacity(depth),
            });
        }
        Self {
            tracked,
            depth,
            bars_seen: 0,
        }
    }

    /// Fold one new candle into every tracked indicator.
    pub fn update(&mut self, bar: &PricePoint) {
        for entry in self.tracked.values_mut() {
            let value = entry.state.update(bar);
            if entry.history.len() == self.depth {
                entry.history.pop_front();
            }
            entry.history.push_back(value);
        }
        self.bars_seen += 1;
    }

    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }
}

impl IndicatorSource for RollingIndicators {
    fn value(&self, indicator: &IndicatorType, back: usize) -> Option<IndicatorValue> {
        let history = &self.tracked.get(indicator)?.history;
        let idx = history.len().checked_sub(back + 1)?;
        history[idx]
    }
}

//! Trade pairing: turns a sparse Buy/Sell stream into closed trades.
//!
//! Buy times and sell times are scanned with two cursors. A sell strictly
//! after the current buy closes a trade and both cursors advance; any other
//! sell (earlier than the buy, or a time absent from the price table) is
//! skipped on its own. Each buy and each sell is used at most once, and the
//! scan stops when either list runs out.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::domain::ohlcv::PriceTable;
use crate::domain::signal::{Signal, SignalRow};
use crate::domain::trade::Trade;

pub const DEFAULT_TRADE_SIZE_FRACTION: f64 = 0.10;
pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;

/// Fixed fractional sizing: every trade commits
/// `trade_size_fraction * initial_balance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeSizing {
    pub trade_size_fraction: f64,
    pub initial_balance: f64,
}

impl TradeSizing {
    pub fn trade_value(&self) -> f64 {
        self.trade_size_fraction * self.initial_balance
    }
}

impl Default for TradeSizing {
    fn default() -> Self {
        TradeSizing {
            trade_size_fraction: DEFAULT_TRADE_SIZE_FRACTION,
            initial_balance: DEFAULT_INITIAL_BALANCE,
        }
    }
}

/// Times carrying `signal`, ascending.
pub fn signal_times(signals: &[SignalRow], signal: Signal) -> Vec<NaiveDateTime> {
    let mut times: Vec<NaiveDateTime> = signals
        .iter()
        .filter(|s| s.signal == signal)
        .map(|s| s.time)
        .collect();
    times.sort();
    times
}

pub fn calculate_pnl(table: &PriceTable, signals: &[SignalRow], sizing: TradeSizing) -> Vec<Trade> {
    let buy_times = signal_times(signals, Signal::Buy);
    let sell_times = signal_times(signals, Signal::Sell);
    let trade_value = sizing.trade_value();

    let mut trades = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < buy_times.len() && j < sell_times.len() {
        let buy_time = buy_times[i];
        let sell_time = sell_times[j];

        let prices = if sell_time > buy_time {
            table.at(buy_time).zip(table.at(sell_time))
        } else {
            None
        };

        match prices {
            Some((entry, exit)) => {
                trades.push(Trade::close(
                    entry.time,
                    entry.close,
                    exit.time,
                    exit.close,
                    trade_value,
                ));
                i += 1;
                j += 1;
            }
            None => j += 1,
        }
    }

    debug!(
        buys = buy_times.len(),
        sells = sell_times.len(),
        trades = trades.len(),
        "trades paired"
    );
    trades
}

//! Backtest parameters and the signal -> trade -> summary pipeline.

use tracing::info;

use crate::domain::metrics::{PerformanceSummary, summarize};
use crate::domain::ohlcv::PriceTable;
use crate::domain::pairing::{
    DEFAULT_INITIAL_BALANCE, DEFAULT_TRADE_SIZE_FRACTION, TradeSizing, calculate_pnl,
};
use crate::domain::signal::{SignalRow, generate_signals};
use crate::domain::strategy::Strategy;
use crate::domain::trade::Trade;

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub initial_balance: f64,
    pub trade_size_fraction: f64,
    pub risk_free_rate: f64,
}

impl BacktestConfig {
    pub fn sizing(&self) -> TradeSizing {
        TradeSizing {
            trade_size_fraction: self.trade_size_fraction,
            initial_balance: self.initial_balance,
        }
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_balance: DEFAULT_INITIAL_BALANCE,
            trade_size_fraction: DEFAULT_TRADE_SIZE_FRACTION,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy: Strategy,
    pub signals: Vec<SignalRow>,
    pub trades: Vec<Trade>,
    /// `None` when there were not enough signals to trade.
    pub summary: Option<PerformanceSummary>,
}

pub fn run_backtest(
    table: &PriceTable,
    strategy: &Strategy,
    config: &BacktestConfig,
) -> BacktestResult {
    let signals = generate_signals(table, strategy);
    let trades = calculate_pnl(table, &signals, config.sizing());
    let summary = summarize(&signals, trades.clone(), config);

    info!(
        strategy = %strategy,
        rows = table.len(),
        trades = trades.len(),
        summarized = summary.is_some(),
        "backtest complete"
    );

    BacktestResult {
        strategy: strategy.clone(),
        signals,
        trades,
        summary,
    }
}

//! Signal generation: maps indicator columns to one Buy/Sell/Hold per row.
//!
//! Buy conditions are evaluated first and sell conditions second; a row that
//! satisfies both ends up `Sell`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::domain::indicator::IndicatorColumn;
use crate::domain::ohlcv::PriceTable;
use crate::domain::rule_eval::evaluate;
use crate::domain::strategy::{SignalRules, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn label(self) -> &'static str {
        match self {
            Signal::Buy => "Buy",
            Signal::Sell => "Sell",
            Signal::Hold => "Hold",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Signal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Signal::Buy),
            "sell" => Ok(Signal::Sell),
            "hold" | "" => Ok(Signal::Hold),
            other => Err(format!("unknown signal '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRow {
    pub time: NaiveDateTime,
    pub signal: Signal,
}

/// Required columns of `strategy` that `table` does not carry.
pub fn missing_columns(table: &PriceTable, strategy: &Strategy) -> Vec<IndicatorColumn> {
    strategy
        .required_columns()
        .iter()
        .copied()
        .filter(|c| !table.has_column(*c))
        .collect()
}

/// One signal per row of `table`. Unknown strategies, `Strategy::None` and
/// strategies whose columns are absent yield all `Hold`.
pub fn generate_signals(table: &PriceTable, strategy: &Strategy) -> Vec<SignalRow> {
    let rules = match strategy.rules() {
        Some(r) => r,
        None => {
            if let Strategy::Unknown(name) = strategy {
                warn!(strategy = %name, "strategy not recognized, all rows hold");
            }
            return hold_all(table);
        }
    };

    let missing = missing_columns(table, strategy);
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|c| c.name()).collect();
        warn!(
            strategy = %strategy,
            missing = %names.join(", "),
            "required indicator columns absent, all rows hold"
        );
        return hold_all(table);
    }

    let signals = apply_rules(table, &rules);
    debug!(
        strategy = %strategy,
        rows = signals.len(),
        buys = count(&signals, Signal::Buy),
        sells = count(&signals, Signal::Sell),
        "signals generated"
    );
    signals
}

/// Evaluate `rules` on every row: buy first, then sell, so sell wins a row
/// where both fire.
pub fn apply_rules(table: &PriceTable, rules: &SignalRules) -> Vec<SignalRow> {
    let mut signals = hold_all(table);
    for (row, slot) in signals.iter_mut().enumerate() {
        if evaluate(&rules.buy, table, row) {
            slot.signal = Signal::Buy;
        }
        if evaluate(&rules.sell, table, row) {
            slot.signal = Signal::Sell;
        }
    }
    signals
}

fn hold_all(table: &PriceTable) -> Vec<SignalRow> {
    table
        .bars()
        .iter()
        .map(|bar| SignalRow {
            time: bar.time,
            signal: Signal::Hold,
        })
        .collect()
}

/// Number of rows carrying `signal`.
pub fn count(signals: &[SignalRow], signal: Signal) -> usize {
    signals.iter().filter(|s| s.signal == signal).count()
}

//! Closed round-trip trades.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub pnl: f64,
}

impl Trade {
    /// Open a trade worth `trade_value` at `entry_price` and close it at
    /// `exit_price`.
    pub fn close(
        entry_time: NaiveDateTime,
        entry_price: f64,
        exit_time: NaiveDateTime,
        exit_price: f64,
        trade_value: f64,
    ) -> Self {
        let quantity = trade_value / entry_price;
        Trade {
            entry_time,
            exit_time,
            entry_price,
            exit_price,
            quantity,
            pnl: (exit_price - entry_price) * quantity,
        }
    }

    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use sigtrader::domain::backtest::BacktestConfig;
use sigtrader::domain::error::SigtraderError;
pub use sigtrader::domain::indicator::IndicatorColumn;
pub use sigtrader::domain::ohlcv::{OhlcvBar, PriceTable};
pub use sigtrader::domain::signal::{Signal, SignalRow};
use sigtrader::ports::data_port::{DataPort, SignalSource};
use std::cell::Cell;

/// Serves a fixed table, applying the date window the way the CSV loader does.
pub struct MockDataPort {
    pub table: PriceTable,
    pub fetches: Cell<usize>,
}

impl MockDataPort {
    pub fn new(table: PriceTable) -> Self {
        Self {
            table,
            fetches: Cell::new(0),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_table(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceTable, SigtraderError> {
        self.fetches.set(self.fetches.get() + 1);
        let keep: Vec<usize> = self
            .table
            .bars()
            .iter()
            .enumerate()
            .filter(|(_, b)| {
                let d = b.time.date();
                start_date.is_none_or(|s| d >= s) && end_date.is_none_or(|e| d <= e)
            })
            .map(|(i, _)| i)
            .collect();

        let bars = keep.iter().map(|&i| self.table.bars()[i].clone()).collect();
        let mut table = PriceTable::new(bars)?;
        for column in IndicatorColumn::ALL {
            if let Some(values) = self.table.column(column) {
                table = table.with_column(column, keep.iter().map(|&i| values[i]).collect())?;
            }
        }
        Ok(table)
    }
}

pub struct MockSignalSource {
    pub result: Result<Vec<SignalRow>, String>,
}

impl SignalSource for MockSignalSource {
    fn fetch_signals(&self) -> Result<Vec<SignalRow>, SigtraderError> {
        match &self.result {
            Ok(rows) => Ok(rows.clone()),
            Err(column) => Err(SigtraderError::MissingColumn {
                column: column.clone(),
            }),
        }
    }
}

/// Midnight on day `day`, counting 2024-01-01 as day 1. Runs past month end.
pub fn t(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + TimeDelta::days(i64::from(day) - 1)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(day: u32, close: f64) -> OhlcvBar {
    OhlcvBar {
        time: t(day),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

/// Daily bars starting 2024-01-01.
pub fn make_table(closes: &[f64]) -> PriceTable {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i as u32 + 1, c))
        .collect();
    PriceTable::new(bars).unwrap()
}

pub fn make_table_with(closes: &[f64], columns: &[(IndicatorColumn, Vec<f64>)]) -> PriceTable {
    columns
        .iter()
        .fold(make_table(closes), |table, (c, values)| {
            table.with_column(*c, values.clone()).unwrap()
        })
}

/// Daily signal rows for days `1..=len`.
pub fn make_signals(len: u32, buys: &[u32], sells: &[u32]) -> Vec<SignalRow> {
    (1..=len)
        .map(|day| SignalRow {
            time: t(day),
            signal: if sells.contains(&day) {
                Signal::Sell
            } else if buys.contains(&day) {
                Signal::Buy
            } else {
                Signal::Hold
            },
        })
        .collect()
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig::default()
}

/// Six rows where the EMA + RSI rules fire Buy on day 2 and day 5, Sell on
/// day 3 and day 6.
pub fn ema_rsi_table() -> PriceTable {
    make_table_with(
        &[100.0, 100.0, 110.0, 105.0, 100.0, 120.0],
        &[
            (
                IndicatorColumn::Ema,
                vec![100.0, 105.0, 105.0, 105.0, 104.0, 110.0],
            ),
            (
                IndicatorColumn::Rsi,
                vec![50.0, 25.0, 75.0, 50.0, 20.0, 80.0],
            ),
        ],
    )
}

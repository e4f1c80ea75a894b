//! Core domain types and logic: signals, trade pairing and metrics.

pub mod ohlcv;
pub mod indicator;
pub mod rule;
pub mod rule_eval;
pub mod strategy;
pub mod signal;
pub mod trade;
pub mod pairing;
pub mod metrics;
pub mod backtest;
pub mod config_validation;
pub mod error;

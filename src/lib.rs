//! sigtrader: rule-based strategy signals, trade pairing and performance
//! metrics over a precomputed price/indicator table.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;

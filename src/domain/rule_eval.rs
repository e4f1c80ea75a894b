//! Rule evaluation engine.
//!
//! Evaluates rules against a price table at a single row.
//!
//! # Evaluation Semantics
//!
//! - Operands that cannot be resolved (absent column, warm-up NaN, rolling
//!   window not yet full) resolve to NaN.
//! - Any comparison involving NaN is `false`, so the row stays `Hold`.
//! - `AND`: Short-circuits on first `false`

use crate::domain::indicator::rolling::rolling_mean_at;
use crate::domain::ohlcv::PriceTable;
use crate::domain::rule::{Operand, Rule};

pub fn evaluate(rule: &Rule, table: &PriceTable, row: usize) -> bool {
    match rule {
        Rule::Above { left, right } => {
            let left_val = resolve_operand(left, table, row);
            let right_val = resolve_operand(right, table, row);
            left_val > right_val
        }
        Rule::Below { left, right } => {
            let left_val = resolve_operand(left, table, row);
            let right_val = resolve_operand(right, table, row);
            left_val < right_val
        }
        Rule::And(rules) => {
            for r in rules {
                if !evaluate(r, table, row) {
                    return false;
                }
            }
            true
        }
    }
}

fn resolve_operand(operand: &Operand, table: &PriceTable, row: usize) -> f64 {
    match operand {
        Operand::Close => table.bar(row).map_or(f64::NAN, |b| b.close),
        Operand::Constant(v) => *v,
        Operand::Column(column) => table
            .column(*column)
            .and_then(|values| values.get(row).copied())
            .unwrap_or(f64::NAN),
        Operand::RollingMean { column, window } => table
            .column(*column)
            .map_or(f64::NAN, |values| rolling_mean_at(values, *window, row)),
    }
}

//! Rule AST data structures.
//!
//! This module defines the abstract syntax tree for signal conditions:
//! - `Operand`: What can be compared (close price, constants, indicator columns)
//! - `Rule`: Comparison and conjunction variants
//!
//! Every strategy's buy and sell conditions are written as `Rule` values, see
//! [`crate::domain::strategy::Strategy::rules`].

use crate::domain::indicator::IndicatorColumn;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Close,
    Constant(f64),
    Column(IndicatorColumn),
    RollingMean {
        column: IndicatorColumn,
        window: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Above { left: Operand, right: Operand },
    Below { left: Operand, right: Operand },
    And(Vec<Rule>),
}

impl Rule {
    pub fn above(left: Operand, right: Operand) -> Self {
        Rule::Above { left, right }
    }

    pub fn below(left: Operand, right: Operand) -> Self {
        Rule::Below { left, right }
    }
}

/// Indicator columns referenced anywhere in `rule`.
pub fn extract_columns(rule: &Rule) -> BTreeSet<IndicatorColumn> {
    let mut out = BTreeSet::new();
    collect_columns(rule, &mut out);
    out
}

fn collect_columns(rule: &Rule, out: &mut BTreeSet<IndicatorColumn>) {
    match rule {
        Rule::Above { left, right } | Rule::Below { left, right } => {
            operand_column(left, out);
            operand_column(right, out);
        }
        Rule::And(rules) => {
            for r in rules {
                collect_columns(r, out);
            }
        }
    }
}

fn operand_column(operand: &Operand, out: &mut BTreeSet<IndicatorColumn>) {
    match operand {
        Operand::Column(c) | Operand::RollingMean { column: c, .. } => {
            out.insert(*c);
        }
        Operand::Close | Operand::Constant(_) => {}
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Close => write!(f, "Close"),
            Operand::Constant(v) => write!(f, "{}", v),
            Operand::Column(c) => write!(f, "{}", c),
            Operand::RollingMean { column, window } => write!(f, "MEAN({}, {})", column, window),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Above { left, right } => write!(f, "{} > {}", left, right),
            Rule::Below { left, right } => write!(f, "{} < {}", left, right),
            Rule::And(rules) => {
                for (i, r) in rules.iter().enumerate() {
                    if i > 0 {
                        write!(f, " AND ")?;
                    }
                    write!(f, "{}", r)?;
                }
                Ok(())
            }
        }
    }
}

//! Strategy identifiers and their buy/sell rule table.

use crate::domain::indicator::IndicatorColumn;
use crate::domain::rule::{Operand, Rule};
use std::fmt;

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const STOCH_OVERSOLD: f64 = 20.0;
const STOCH_OVERBOUGHT: f64 = 80.0;
const ATR_MEAN_WINDOW: usize = 5;
const OBV_MEAN_WINDOW: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Strategy {
    EmaRsi,
    MacdRsi,
    EmaCrossover,
    MacdBbands,
    StochAtr,
    ObvRsi,
    EmaMacd,
    Ema,
    Rsi,
    Macd,
    Stochastic,
    Atr,
    Obv,
    None,
    Unknown(String),
}

/// Buy and sell conditions for one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRules {
    pub buy: Rule,
    pub sell: Rule,
}

impl Strategy {
    /// Every named strategy, in menu order.
    pub const ALL: [Strategy; 14] = [
        Strategy::None,
        Strategy::EmaRsi,
        Strategy::MacdRsi,
        Strategy::EmaCrossover,
        Strategy::MacdBbands,
        Strategy::StochAtr,
        Strategy::ObvRsi,
        Strategy::EmaMacd,
        Strategy::Ema,
        Strategy::Rsi,
        Strategy::Macd,
        Strategy::Stochastic,
        Strategy::Atr,
        Strategy::Obv,
    ];

    /// Resolve a strategy name. Whitespace and ASCII case are ignored, so
    /// "EMA + RSI", "EMA+RSI" and "ema+rsi" are the same strategy. Names that
    /// match nothing become `Unknown`.
    pub fn parse(name: &str) -> Self {
        let wanted = normalize(name);
        Self::ALL
            .into_iter()
            .find(|s| normalize(s.name()) == wanted)
            .unwrap_or_else(|| Strategy::Unknown(name.trim().to_string()))
    }

    pub fn name(&self) -> &str {
        match self {
            Strategy::EmaRsi => "EMA + RSI",
            Strategy::MacdRsi => "MACD + RSI",
            Strategy::EmaCrossover => "EMA Crossover",
            Strategy::MacdBbands => "MACD + BBands",
            Strategy::StochAtr => "Stoch + ATR",
            Strategy::ObvRsi => "OBV + RSI",
            Strategy::EmaMacd => "EMA + MACD",
            Strategy::Ema => "EMA",
            Strategy::Rsi => "RSI",
            Strategy::Macd => "MACD",
            Strategy::Stochastic => "Stochastic",
            Strategy::Atr => "ATR",
            Strategy::Obv => "OBV",
            Strategy::None => "None",
            Strategy::Unknown(name) => name,
        }
    }

    /// Indicator columns the strategy's rules read.
    pub fn required_columns(&self) -> &'static [IndicatorColumn] {
        use IndicatorColumn::*;
        match self {
            Strategy::EmaRsi => &[Ema, Rsi],
            Strategy::MacdRsi => &[Rsi, Macd, MacdSignal],
            Strategy::EmaCrossover => &[Ema, Ema50],
            Strategy::MacdBbands => &[Macd, BbUpper, BbLower],
            Strategy::StochAtr => &[StochK, Atr],
            Strategy::ObvRsi => &[Rsi, Obv],
            Strategy::EmaMacd => &[Ema, Macd],
            Strategy::Ema => &[Ema],
            Strategy::Rsi => &[Rsi],
            Strategy::Macd => &[Macd, MacdSignal],
            Strategy::Stochastic => &[StochK],
            Strategy::Atr => &[Atr],
            Strategy::Obv => &[Obv],
            Strategy::None | Strategy::Unknown(_) => &[],
        }
    }

    /// Buy/sell rules, or `None` for `Strategy::None` and unknown names.
    pub fn rules(&self) -> Option<SignalRules> {
        use IndicatorColumn::*;
        let (buy, sell) = match self {
            Strategy::EmaRsi => (
                all([gt(col(Ema), Operand::Close), lt(col(Rsi), c(RSI_OVERSOLD))]),
                all([lt(col(Ema), Operand::Close), gt(col(Rsi), c(RSI_OVERBOUGHT))]),
            ),
            Strategy::MacdRsi => (
                all([gt(col(Macd), col(MacdSignal)), lt(col(Rsi), c(RSI_OVERSOLD))]),
                all([lt(col(Macd), col(MacdSignal)), gt(col(Rsi), c(RSI_OVERBOUGHT))]),
            ),
            Strategy::EmaCrossover => (gt(col(Ema), col(Ema50)), lt(col(Ema), col(Ema50))),
            Strategy::MacdBbands => (
                all([gt(col(Macd), c(0.0)), lt(Operand::Close, col(BbLower))]),
                all([lt(col(Macd), c(0.0)), gt(Operand::Close, col(BbUpper))]),
            ),
            Strategy::StochAtr => (
                all([lt(col(StochK), c(STOCH_OVERSOLD)), gt(col(Atr), mean(Atr, ATR_MEAN_WINDOW))]),
                all([gt(col(StochK), c(STOCH_OVERBOUGHT)), gt(col(Atr), mean(Atr, ATR_MEAN_WINDOW))]),
            ),
            Strategy::ObvRsi => (
                all([gt(col(Obv), mean(Obv, OBV_MEAN_WINDOW)), lt(col(Rsi), c(RSI_OVERSOLD))]),
                all([lt(col(Obv), mean(Obv, OBV_MEAN_WINDOW)), gt(col(Rsi), c(RSI_OVERBOUGHT))]),
            ),
            Strategy::EmaMacd => (
                all([gt(col(Ema), Operand::Close), gt(col(Macd), c(0.0))]),
                all([lt(col(Ema), Operand::Close), lt(col(Macd), c(0.0))]),
            ),
            Strategy::Ema => (gt(Operand::Close, col(Ema)), lt(Operand::Close, col(Ema))),
            Strategy::Rsi => (lt(col(Rsi), c(RSI_OVERSOLD)), gt(col(Rsi), c(RSI_OVERBOUGHT))),
            Strategy::Macd => (gt(col(Macd), col(MacdSignal)), lt(col(Macd), col(MacdSignal))),
            Strategy::Stochastic => (
                lt(col(StochK), c(STOCH_OVERSOLD)),
                gt(col(StochK), c(STOCH_OVERBOUGHT)),
            ),
            Strategy::Atr => (
                gt(col(Atr), mean(Atr, ATR_MEAN_WINDOW)),
                lt(col(Atr), mean(Atr, ATR_MEAN_WINDOW)),
            ),
            Strategy::Obv => (
                gt(col(Obv), mean(Obv, OBV_MEAN_WINDOW)),
                lt(col(Obv), mean(Obv, OBV_MEAN_WINDOW)),
            ),
            Strategy::None | Strategy::Unknown(_) => return None,
        };
        Some(SignalRules { buy, sell })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

fn col(column: IndicatorColumn) -> Operand {
    Operand::Column(column)
}

fn c(value: f64) -> Operand {
    Operand::Constant(value)
}

fn mean(column: IndicatorColumn, window: usize) -> Operand {
    Operand::RollingMean { column, window }
}

fn gt(left: Operand, right: Operand) -> Rule {
    Rule::above(left, right)
}

fn lt(left: Operand, right: Operand) -> Rule {
    Rule::below(left, right)
}

fn all<const N: usize>(rules: [Rule; N]) -> Rule {
    Rule::And(rules.into())
}

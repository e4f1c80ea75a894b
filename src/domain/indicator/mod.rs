//! Indicator column vocabulary.
//!
//! Indicator values are computed by an external collaborator and handed in as
//! named columns. This module fixes the names the signal rules look up:
//! - `IndicatorColumn`: the closed set of recognised columns
//! - `rolling`: trailing-window helpers evaluated over a column

pub mod rolling;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndicatorColumn {
    Ema,
    Ema50,
    Rsi,
    Macd,
    MacdSignal,
    StochK,
    StochD,
    Atr,
    Obv,
    BbUpper,
    BbLower,
}

impl IndicatorColumn {
    pub const ALL: [IndicatorColumn; 11] = [
        IndicatorColumn::Ema,
        IndicatorColumn::Ema50,
        IndicatorColumn::Rsi,
        IndicatorColumn::Macd,
        IndicatorColumn::MacdSignal,
        IndicatorColumn::StochK,
        IndicatorColumn::StochD,
        IndicatorColumn::Atr,
        IndicatorColumn::Obv,
        IndicatorColumn::BbUpper,
        IndicatorColumn::BbLower,
    ];

    /// Canonical column name.
    pub fn name(self) -> &'static str {
        match self {
            IndicatorColumn::Ema => "EMA",
            IndicatorColumn::Ema50 => "EMA_50",
            IndicatorColumn::Rsi => "RSI",
            IndicatorColumn::Macd => "MACD",
            IndicatorColumn::MacdSignal => "MACD_Signal",
            IndicatorColumn::StochK => "Stoch_K",
            IndicatorColumn::StochD => "Stoch_D",
            IndicatorColumn::Atr => "ATR",
            IndicatorColumn::Obv => "OBV",
            IndicatorColumn::BbUpper => "BB_upper",
            IndicatorColumn::BbLower => "BB_lower",
        }
    }

    /// Resolve a column header. Matches canonical names exactly, plus the
    /// short headers some indicator libraries emit (`MACD_S`, `BBU`, `BBL`).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Some(col) = Self::ALL.into_iter().find(|c| c.name() == name) {
            return Some(col);
        }
        match name {
            "MACD_S" => Some(IndicatorColumn::MacdSignal),
            "BBU" => Some(IndicatorColumn::BbUpper),
            "BBL" => Some(IndicatorColumn::BbLower),
            _ => None,
        }
    }
}

impl fmt::Display for IndicatorColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_round_trip() {
        for col in IndicatorColumn::ALL {
            assert_eq!(IndicatorColumn::from_name(col.name()), Some(col));
        }
    }

    #[test]
    fn display_uses_canonical_name() {
        assert_eq!(IndicatorColumn::MacdSignal.to_string(), "MACD_Signal");
        assert_eq!(IndicatorColumn::Ema50.to_string(), "EMA_50");
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(
            IndicatorColumn::from_name("MACD_S"),
            Some(IndicatorColumn::MacdSignal)
        );
        assert_eq!(IndicatorColumn::from_name("BBU"), Some(IndicatorColumn::BbUpper));
        assert_eq!(IndicatorColumn::from_name("BBL"), Some(IndicatorColumn::BbLower));
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(IndicatorColumn::from_name("ema"), None);
        assert_eq!(IndicatorColumn::from_name("Volume"), None);
        assert_eq!(IndicatorColumn::from_name(" RSI "), Some(IndicatorColumn::Rsi));
    }
}

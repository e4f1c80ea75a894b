//! OHLCV bars and the immutable price/indicator table.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use super::error::SigtraderError;
use super::indicator::IndicatorColumn;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A time-ordered price table with zero or more indicator columns aligned to
/// its rows. Times are strictly increasing and every close is a positive
/// finite price; the table is never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    bars: Vec<OhlcvBar>,
    columns: BTreeMap<IndicatorColumn, Vec<f64>>,
}

impl PriceTable {
    pub fn new(bars: Vec<OhlcvBar>) -> Result<Self, SigtraderError> {
        if let Some(w) = bars.windows(2).find(|w| w[1].time <= w[0].time) {
            return Err(SigtraderError::data(format!(
                "times must be strictly increasing: {} followed by {}",
                w[0].time, w[1].time
            )));
        }
        if let Some((row, b)) = bars
            .iter()
            .enumerate()
            .find(|(_, b)| !(b.close.is_finite() && b.close > 0.0))
        {
            return Err(SigtraderError::data(format!(
                "row {} ({}): close must be a positive price, got {}",
                row, b.time, b.close
            )));
        }
        Ok(Self {
            bars,
            columns: BTreeMap::new(),
        })
    }

    /// Attach an indicator column. Its length must match the row count.
    pub fn with_column(
        mut self,
        column: IndicatorColumn,
        values: Vec<f64>,
    ) -> Result<Self, SigtraderError> {
        if values.len() != self.bars.len() {
            return Err(SigtraderError::data(format!(
                "column {} has {} values, table has {} rows",
                column,
                values.len(),
                self.bars.len()
            )));
        }
        self.columns.insert(column, values);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn bar(&self, index: usize) -> Option<&OhlcvBar> {
        self.bars.get(index)
    }

    pub fn column(&self, column: IndicatorColumn) -> Option<&[f64]> {
        self.columns.get(&column).map(Vec::as_slice)
    }

    pub fn has_column(&self, column: IndicatorColumn) -> bool {
        self.columns.contains_key(&column)
    }

    /// Row index for `time`, if present.
    pub fn index_of(&self, time: NaiveDateTime) -> Option<usize> {
        self.bars.binary_search_by(|b| b.time.cmp(&time)).ok()
    }

    /// Bar at `time`, if present.
    pub fn at(&self, time: NaiveDateTime) -> Option<&OhlcvBar> {
        self.index_of(time).map(|i| &self.bars[i])
    }
}

//! Price and signal table source port trait.

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::PriceTable;
use crate::domain::signal::SignalRow;
use chrono::NaiveDate;

pub trait DataPort {
    /// Load the price/indicator table, keeping rows whose date falls inside
    /// the optional inclusive bounds.
    fn fetch_table(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceTable, SigtraderError>;
}

pub trait SignalSource {
    /// Load a caller-supplied signal table. Fails with
    /// `SigtraderError::MissingColumn` when it has no `Signal` column.
    fn fetch_signals(&self) -> Result<Vec<SignalRow>, SigtraderError>;
}

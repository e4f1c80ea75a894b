//! CSV trade log writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use super::csv_error;
use crate::domain::error::SigtraderError;
use crate::domain::trade::Trade;
use crate::ports::report_port::ReportPort;

pub const TRADE_LOG_HEADER: [&str; 6] = [
    "entry_time",
    "exit_time",
    "entry_price",
    "exit_price",
    "quantity",
    "pnl",
];

pub struct CsvTradeLogAdapter;

impl ReportPort for CsvTradeLogAdapter {
    fn write_trades(&self, trades: &[Trade], output_path: &Path) -> Result<(), SigtraderError> {
        let file = File::create(output_path)?;
        write_trade_log(trades, file)?;
        info!(
            path = %output_path.display(),
            trades = trades.len(),
            "trade log written"
        );
        Ok(())
    }
}

/// Write the header and one row per trade. The header is written even when
/// there are no trades.
pub fn write_trade_log<W: Write>(trades: &[Trade], writer: W) -> Result<(), SigtraderError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(TRADE_LOG_HEADER).map_err(csv_error)?;
    for trade in trades {
        wtr.serialize(trade).map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

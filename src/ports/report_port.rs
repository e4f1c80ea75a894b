//! Report generation port trait.

use crate::domain::error::SigtraderError;
use crate::domain::trade::Trade;
use std::path::Path;

/// Port for writing the trade log of a run.
pub trait ReportPort {
    fn write_trades(&self, trades: &[Trade], output_path: &Path) -> Result<(), SigtraderError>;
}

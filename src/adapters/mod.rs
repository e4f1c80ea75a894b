//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod trade_log_adapter;

use crate::domain::error::SigtraderError;

/// I/O failures stay I/O errors; everything else the csv crate reports is
/// malformed data.
pub(crate) fn csv_error(err: csv::Error) -> SigtraderError {
    let position = err.position().map(|p| p.line());
    match err.into_kind() {
        csv::ErrorKind::Io(e) => SigtraderError::Io(e),
        kind => {
            let reason = match position {
                Some(line) => format!("CSV error on line {}: {:?}", line, kind),
                None => format!("CSV error: {:?}", kind),
            };
            SigtraderError::Data { reason }
        }
    }
}

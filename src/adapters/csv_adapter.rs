//! CSV file adapters for price tables and signal tables.
//!
//! Price files carry a time column (`Date`, `Time` or `Datetime`), the OHLCV
//! columns and any number of indicator columns named as in
//! [`IndicatorColumn::name`]. Blank or `NaN` cells load as NaN, except in
//! `Close`, which must hold a positive price.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

use super::csv_error;
use crate::domain::error::SigtraderError;
use crate::domain::indicator::IndicatorColumn;
use crate::domain::ohlcv::{OhlcvBar, PriceTable};
use crate::domain::signal::{Signal, SignalRow};
use crate::ports::data_port::{DataPort, SignalSource};

const TIME_HEADERS: [&str; 3] = ["date", "time", "datetime"];
const SIGNAL_HEADER: &str = "Signal";

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataPort for CsvAdapter {
    fn fetch_table(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceTable, SigtraderError> {
        debug!(path = %self.path.display(), "loading price table");
        let file = File::open(&self.path)?;
        read_price_table(file, start_date, end_date)
    }
}

/// Column positions resolved from a price file header.
struct PriceLayout {
    time: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: usize,
    volume: Option<usize>,
    indicators: Vec<(IndicatorColumn, usize)>,
}

impl PriceLayout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, SigtraderError> {
        let time = find_time_column(headers)?;
        let close = find_column(headers, "close").ok_or_else(|| SigtraderError::MissingColumn {
            column: "Close".to_string(),
        })?;

        let mut indicators: Vec<(IndicatorColumn, usize)> = Vec::new();
        for (idx, name) in headers.iter().enumerate() {
            let Some(column) = IndicatorColumn::from_name(name) else {
                continue;
            };
            if indicators.iter().any(|(c, _)| *c == column) {
                return Err(SigtraderError::data(format!(
                    "column {} appears more than once",
                    column
                )));
            }
            indicators.push((column, idx));
        }

        let layout = Self {
            time,
            open: find_column(headers, "open"),
            high: find_column(headers, "high"),
            low: find_column(headers, "low"),
            close,
            volume: find_column(headers, "volume"),
            indicators,
        };

        for (idx, name) in headers.iter().enumerate() {
            if !layout.is_known(idx) {
                debug!(column = name, "ignoring unrecognized column");
            }
        }
        Ok(layout)
    }

    fn is_known(&self, idx: usize) -> bool {
        idx == self.time
            || idx == self.close
            || [self.open, self.high, self.low, self.volume].contains(&Some(idx))
            || self.indicators.iter().any(|(_, i)| *i == idx)
    }
}

struct ParsedRow {
    bar: OhlcvBar,
    indicators: Vec<f64>,
}

/// Read a price table from any CSV source, keeping rows whose date lies in
/// the inclusive `[start_date, end_date]` window.
pub fn read_price_table<R: Read>(
    reader: R,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<PriceTable, SigtraderError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers().map_err(csv_error)?.clone();
    let layout = PriceLayout::from_headers(&headers)?;

    let mut rows: Vec<ParsedRow> = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.map_err(csv_error)?;
        // Header is line 1.
        let line = line + 2;

        let time = parse_time(field(&record, layout.time, line)?)
            .map_err(|reason| SigtraderError::data(format!("line {}: {}", line, reason)))?;
        let date = time.date();
        if start_date.is_some_and(|s| date < s) || end_date.is_some_and(|e| date > e) {
            continue;
        }

        let optional = |idx: Option<usize>, name: &str| -> Result<f64, SigtraderError> {
            match idx {
                Some(i) => parse_number(field(&record, i, line)?, name, line),
                None => Ok(f64::NAN),
            }
        };

        let bar = OhlcvBar {
            time,
            open: optional(layout.open, "Open")?,
            high: optional(layout.high, "High")?,
            low: optional(layout.low, "Low")?,
            close: parse_close(field(&record, layout.close, line)?, line)?,
            volume: optional(layout.volume, "Volume")?,
        };

        let indicators = layout
            .indicators
            .iter()
            .map(|(column, idx)| parse_number(field(&record, *idx, line)?, column.name(), line))
            .collect::<Result<Vec<f64>, SigtraderError>>()?;

        rows.push(ParsedRow { bar, indicators });
    }

    rows.sort_by_key(|r| r.bar.time);
    if let Some(w) = rows.windows(2).find(|w| w[0].bar.time == w[1].bar.time) {
        return Err(SigtraderError::data(format!(
            "duplicate time {}",
            w[0].bar.time
        )));
    }

    let mut columns: BTreeMap<IndicatorColumn, Vec<f64>> = layout
        .indicators
        .iter()
        .map(|(c, _)| (*c, Vec::with_capacity(rows.len())))
        .collect();
    let mut bars = Vec::with_capacity(rows.len());
    for row in rows {
        for ((column, _), value) in layout.indicators.iter().zip(row.indicators) {
            if let Some(values) = columns.get_mut(column) {
                values.push(value);
            }
        }
        bars.push(row.bar);
    }

    let mut table = PriceTable::new(bars)?;
    for (column, values) in columns {
        table = table.with_column(column, values)?;
    }

    debug!(
        rows = table.len(),
        indicators = layout.indicators.len(),
        "price table loaded"
    );
    Ok(table)
}

/// Signal table reader: a time column and a `Signal` column of
/// `Buy`/`Sell`/`Hold` labels.
pub struct CsvSignalAdapter {
    path: PathBuf,
}

impl CsvSignalAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SignalSource for CsvSignalAdapter {
    fn fetch_signals(&self) -> Result<Vec<SignalRow>, SigtraderError> {
        debug!(path = %self.path.display(), "loading signal table");
        let file = File::open(&self.path)?;
        read_signals(file)
    }
}

pub fn read_signals<R: Read>(reader: R) -> Result<Vec<SignalRow>, SigtraderError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers().map_err(csv_error)?.clone();

    let signal_idx =
        find_column(&headers, SIGNAL_HEADER).ok_or_else(|| SigtraderError::MissingColumn {
            column: SIGNAL_HEADER.to_string(),
        })?;
    let time_idx = find_time_column(&headers)?;

    let mut signals = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.map_err(csv_error)?;
        let line = line + 2;

        let time = parse_time(field(&record, time_idx, line)?)
            .map_err(|reason| SigtraderError::data(format!("line {}: {}", line, reason)))?;
        let signal: Signal = field(&record, signal_idx, line)?
            .parse()
            .map_err(|reason| SigtraderError::data(format!("line {}: {}", line, reason)))?;
        signals.push(SignalRow { time, signal });
    }

    debug!(rows = signals.len(), "signal table loaded");
    Ok(signals)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

fn find_time_column(headers: &csv::StringRecord) -> Result<usize, SigtraderError> {
    TIME_HEADERS
        .iter()
        .find_map(|name| find_column(headers, name))
        .ok_or_else(|| SigtraderError::MissingColumn {
            column: "Date".to_string(),
        })
}

fn field(record: &csv::StringRecord, idx: usize, line: usize) -> Result<&str, SigtraderError> {
    record
        .get(idx)
        .ok_or_else(|| SigtraderError::data(format!("line {}: missing field {}", line, idx + 1)))
}

fn parse_number(raw: &str, column: &str, line: usize) -> Result<f64, SigtraderError> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    raw.parse().map_err(|_| {
        SigtraderError::data(format!(
            "line {}: invalid {} value '{}'",
            line, column, raw
        ))
    })
}

/// Close must be a positive finite price; unlike indicator cells, a blank or
/// NaN close is an error.
fn parse_close(raw: &str, line: usize) -> Result<f64, SigtraderError> {
    match raw.parse::<f64>() {
        Ok(close) if close.is_finite() && close > 0.0 => Ok(close),
        _ => Err(SigtraderError::data(format!(
            "line {}: Close must be a positive price, got '{}'",
            line, raw
        ))),
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` (or with a `T`) and RFC 3339.
/// Offsets are normalized to UTC.
pub fn parse_time(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(time) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(time);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.naive_utc())
        .map_err(|_| format!("invalid time '{}'", raw))
}

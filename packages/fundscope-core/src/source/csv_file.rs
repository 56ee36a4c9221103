//! Offline price source reading a wide CSV file.
//!
//! Layout: a date column first, then one column of closes per ticker:
//!
//! ```text
//! Date,VFIAX,SPY
//! 2024-01-02,435.12,472.65
//! 2024-01-03,,468.79
//! ```

use super::PriceSource;
use crate::types::{DateRange, RawPriceTable, RawSeries};
use crate::{Error, Result};
use chrono::NaiveDate;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads closes from a wide CSV file on every fetch.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    path: PathBuf,
}

impl CsvPriceSource {
    /// Serve prices from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceSource for CsvPriceSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_closes(&self, tickers: &[String], range: &DateRange) -> Result<RawPriceTable> {
        let file = std::fs::File::open(&self.path)?;
        let table = read_wide_csv(file, tickers, range)?;
        debug!(path = %self.path.display(), tickers = ?table.tickers(), "read price file");
        Ok(table)
    }
}

/// Parse the requested ticker columns of a wide CSV, keeping rows inside `range`.
pub(crate) fn read_wide_csv<R: Read>(
    reader: R,
    tickers: &[String],
    range: &DateRange,
) -> Result<RawPriceTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut columns: Vec<(usize, RawSeries)> = Vec::new();
    for ticker in tickers {
        match headers
            .iter()
            .skip(1)
            .position(|h| h.eq_ignore_ascii_case(ticker))
        {
            Some(pos) => columns.push((pos + 1, RawSeries::new(ticker))),
            None => warn!(ticker = %ticker, "ticker column not found in price file"),
        }
    }

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let raw_date = record.get(0).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| {
            Error::Source(format!("row {}: invalid date '{raw_date}'", line + 2))
        })?;
        if !range.contains(date) {
            continue;
        }

        for (idx, series) in columns.iter_mut() {
            let cell = record.get(*idx).unwrap_or_default();
            let close = if cell.is_empty() {
                None
            } else {
                Some(cell.parse::<f64>().map_err(|_| {
                    Error::Source(format!(
                        "row {}: invalid close '{cell}' for {}",
                        line + 2,
                        series.ticker
                    ))
                })?)
            };
            series.push(date, close);
        }
    }

    Ok(columns
        .into_iter()
        .fold(RawPriceTable::new(), |table, (_, series)| {
            table.with_series(series)
        }))
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

//! Historical price sources.
//!
//! A source returns raw daily closes for a list of tickers over an inclusive
//! date range. Results may be partial: tickers without data are simply
//! absent and the analytics engine rejects the request.

mod csv_file;
mod yahoo;

pub use csv_file::CsvPriceSource;
pub use yahoo::{parse_chart_response, YahooPriceSource, DEFAULT_YAHOO_BASE_URL};

use crate::types::{DateRange, RawPriceTable, RawSeries};
use crate::Result;

/// Fetches daily closing prices.
pub trait PriceSource {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Fetch closes for `tickers` within `range` (both ends inclusive).
    fn fetch_closes(&self, tickers: &[String], range: &DateRange) -> Result<RawPriceTable>;
}

/// In-memory source serving a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    table: RawPriceTable,
}

impl StaticPriceSource {
    /// Serve the given table.
    pub fn new(table: RawPriceTable) -> Self {
        Self { table }
    }
}

impl PriceSource for StaticPriceSource {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_closes(&self, tickers: &[String], range: &DateRange) -> Result<RawPriceTable> {
        let mut out = RawPriceTable::new();
        for ticker in tickers {
            if let Some(series) = self.table.get(ticker) {
                out.insert(RawSeries {
                    ticker: series.ticker.clone(),
                    points: series
                        .points
                        .iter()
                        .filter(|(date, _)| range.contains(*date))
                        .copied()
                        .collect(),
                });
            }
        }
        Ok(out)
    }
}

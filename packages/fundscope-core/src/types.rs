//! Core data types for the fund vs benchmark dashboard.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive calendar date range `[start, end]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    /// First date (inclusive)
    pub start: NaiveDate,
    /// Last date (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting one that ends before it starts.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidRequest(format!(
                "date range ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// One row of the fund registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FundListing {
    /// Fund ticker symbol (uppercase)
    #[serde(rename = "Ticker")]
    pub ticker: String,
    /// Benchmark ticker symbol (uppercase)
    #[serde(rename = "Benchmark Ticker")]
    pub benchmark_ticker: String,
    /// Fund display name
    #[serde(rename = "Name")]
    pub name: String,
    /// Benchmark display name
    #[serde(rename = "New Benchmark Name")]
    pub benchmark_name: String,
}

impl FundListing {
    /// Create a listing; symbols are upper-cased.
    pub fn new(ticker: &str, benchmark_ticker: &str, name: &str, benchmark_name: &str) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            benchmark_ticker: benchmark_ticker.trim().to_uppercase(),
            name: name.trim().to_string(),
            benchmark_name: benchmark_name.trim().to_string(),
        }
    }

    /// The `[fund, benchmark]` pair handed to a price source.
    pub fn tickers(&self) -> [String; 2] {
        [self.ticker.clone(), self.benchmark_ticker.clone()]
    }
}

/// Closing prices for one ticker as returned by a price source.
///
/// Coverage may be irregular and individual closes may be missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RawSeries {
    /// Ticker symbol
    pub ticker: String,
    /// (date, close) points in any order; `None` marks a missing close
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

impl RawSeries {
    /// Create an empty series for a ticker.
    pub fn new(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_uppercase(),
            points: Vec::new(),
        }
    }

    /// Build a series from fully populated closes.
    pub fn from_closes<I>(ticker: &str, closes: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self {
            ticker: ticker.to_uppercase(),
            points: closes.into_iter().map(|(d, c)| (d, Some(c))).collect(),
        }
    }

    /// Append a point.
    pub fn push(&mut self, date: NaiveDate, close: Option<f64>) {
        self.points.push((date, close));
    }

    /// Number of points carrying a finite close.
    pub fn usable_len(&self) -> usize {
        self.points
            .iter()
            .filter(|(_, c)| c.map(f64::is_finite).unwrap_or(false))
            .count()
    }
}

/// Unaligned per-ticker price data, before cleaning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RawPriceTable {
    series: BTreeMap<String, RawSeries>,
}

impl RawPriceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a series, replacing any previous series for the same ticker.
    pub fn insert(&mut self, series: RawSeries) {
        self.series.insert(series.ticker.clone(), series);
    }

    /// Builder-style insert.
    pub fn with_series(mut self, series: RawSeries) -> Self {
        self.insert(series);
        self
    }

    /// Look up a ticker (case-insensitive).
    pub fn get(&self, ticker: &str) -> Option<&RawSeries> {
        self.series.get(&ticker.to_uppercase())
    }

    /// Tickers present in the table.
    pub fn tickers(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }

    /// Whether no series carries a single usable close.
    pub fn is_empty(&self) -> bool {
        self.series.values().all(|s| s.usable_len() == 0)
    }
}

/// An ordered, gap-free daily closing price series for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstrumentSeries {
    /// Ticker symbol
    pub ticker: String,
    /// (date, close) pairs with strictly increasing dates
    pub points: Vec<(NaiveDate, f64)>,
}

impl InstrumentSeries {
    /// Create a series, checking that dates strictly increase.
    pub fn new(ticker: &str, points: Vec<(NaiveDate, f64)>) -> Result<Self> {
        if let Some(pair) = points.windows(2).find(|w| w[1].0 <= w[0].0) {
            return Err(Error::InvalidRequest(format!(
                "{ticker}: dates must strictly increase ({} then {})",
                pair[0].0, pair[1].0
            )));
        }
        Ok(Self {
            ticker: ticker.to_uppercase(),
            points,
        })
    }

    /// Closing prices in date order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One instrument's values on an aligned date index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceColumn {
    /// Ticker symbol
    pub ticker: String,
    /// Display label (fund name, `Benchmark`, or the ticker)
    pub label: String,
    /// One value per date of the owning table
    pub values: Vec<f64>,
}

impl PriceColumn {
    /// Create a column labelled with its ticker.
    pub fn new(ticker: &str, values: Vec<f64>) -> Self {
        Self {
            ticker: ticker.to_string(),
            label: ticker.to_string(),
            values,
        }
    }

    /// First value, if any.
    pub fn first(&self) -> Option<f64> {
        self.values.first().copied()
    }

    /// Last value, if any.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// Closing prices for the tracked instrument and its benchmark on a shared date index.
///
/// Every date has a value for both instruments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceTable {
    /// Shared, strictly increasing dates
    pub dates: Vec<NaiveDate>,
    /// Tracked instrument (the fund)
    pub tracked: PriceColumn,
    /// Benchmark instrument
    pub benchmark: PriceColumn,
}

impl PriceTable {
    /// Number of aligned rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Both columns, tracked first.
    pub fn columns(&self) -> [&PriceColumn; 2] {
        [&self.tracked, &self.benchmark]
    }

    /// Replace the display labels of both columns.
    pub fn with_labels(mut self, tracked: &str, benchmark: &str) -> Self {
        self.tracked.label = tracked.to_string();
        self.benchmark.label = benchmark.to_string();
        self
    }

    /// Extract one ticker as a standalone series.
    pub fn series(&self, ticker: &str) -> Option<InstrumentSeries> {
        let column = self
            .columns()
            .into_iter()
            .find(|c| c.ticker.eq_ignore_ascii_case(ticker))?;

        Some(InstrumentSeries {
            ticker: column.ticker.clone(),
            points: self
                .dates
                .iter()
                .copied()
                .zip(column.values.iter().copied())
                .collect(),
        })
    }
}

/// A price table rescaled so every instrument starts at 100.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedSeries {
    /// Shared, strictly increasing dates
    pub dates: Vec<NaiveDate>,
    /// Tracked instrument, base 100
    pub tracked: PriceColumn,
    /// Benchmark instrument, base 100
    pub benchmark: PriceColumn,
}

impl NormalizedSeries {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Both columns, tracked first.
    pub fn columns(&self) -> [&PriceColumn; 2] {
        [&self.tracked, &self.benchmark]
    }
}

/// Percentage return of one instrument over the window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnFigure {
    /// Ticker symbol
    pub ticker: String,
    /// Display label
    pub label: String,
    /// Return in percent, rounded to 2 decimals
    pub percent: f64,
}

/// Point-in-time returns for the tracked instrument and its benchmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnSnapshot {
    /// Tracked instrument return
    pub tracked: ReturnFigure,
    /// Benchmark return
    pub benchmark: ReturnFigure,
}

impl ReturnSnapshot {
    /// Look up a return by display label.
    pub fn get(&self, label: &str) -> Option<f64> {
        [&self.tracked, &self.benchmark]
            .into_iter()
            .find(|f| f.label == label)
            .map(|f| f.percent)
    }
}

/// Risk figures for the tracked instrument.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskSnapshot {
    /// Annualized volatility percentage
    pub volatility_percent: f64,
    /// Maximum drawdown percentage (zero or negative)
    pub max_drawdown_percent: f64,
    /// 1-day historical Value at Risk as a return percentage
    pub var_percent: f64,
    /// Confidence level used for VaR (e.g. 0.95)
    pub var_confidence: f64,
    /// Number of daily return observations used
    pub observations: usize,
}

/// API response wrapper used by the CLI's JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

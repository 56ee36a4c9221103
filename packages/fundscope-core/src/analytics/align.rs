//! Alignment of raw per-ticker closes onto a shared date index.

use crate::types::{PriceColumn, PriceTable, RawPriceTable, RawSeries};
use crate::{Error, Result};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Align two raw series on the union of their dates.
///
/// Each series is forward-filled with its last known close, then any date
/// on which either ticker still has no value (leading rows before its first
/// close) is dropped.
///
/// # Arguments
///
/// * `raw` - Price source output, possibly with gaps and missing closes
/// * `tickers` - Exactly two distinct symbols: tracked instrument first, benchmark second
///
/// # Returns
///
/// A `PriceTable` whose columns are labelled with their tickers, or
/// `Error::DataUnavailable` if a ticker is missing, no rows survive, or a
/// column does not start on a positive close.
pub fn align_and_clean(raw: &RawPriceTable, tickers: &[String]) -> Result<PriceTable> {
    let (tracked, benchmark) = match tickers {
        [a, b] if !a.eq_ignore_ascii_case(b) => (a.to_uppercase(), b.to_uppercase()),
        [a, _] => {
            return Err(Error::InvalidRequest(format!(
                "tracked and benchmark tickers must differ (both {a})"
            )))
        }
        _ => {
            return Err(Error::InvalidRequest(format!(
                "expected exactly 2 tickers, got {}",
                tickers.len()
            )))
        }
    };

    if raw.is_empty() {
        return Err(Error::DataUnavailable(
            "no data was retrieved for the requested tickers".to_string(),
        ));
    }

    let usable = |ticker: &str| raw.get(ticker).filter(|s| s.usable_len() > 0);
    let (tracked_series, benchmark_series) = match (usable(&tracked), usable(&benchmark)) {
        (Some(t), Some(b)) => (t, b),
        (t, b) => {
            let missing: Vec<&str> = [(t.is_none(), &tracked), (b.is_none(), &benchmark)]
                .into_iter()
                .filter(|(absent, _)| *absent)
                .map(|(_, ticker)| ticker.as_str())
                .collect();
            return Err(Error::DataUnavailable(format!(
                "data for the following tickers could not be retrieved: {}",
                missing.join(", ")
            )));
        }
    };

    let tracked_points = closes_by_date(tracked_series);
    let benchmark_points = closes_by_date(benchmark_series);

    let all_dates: BTreeSet<NaiveDate> = tracked_points
        .keys()
        .chain(benchmark_points.keys())
        .copied()
        .collect();

    let tracked_filled = forward_fill(&all_dates, &tracked_points);
    let benchmark_filled = forward_fill(&all_dates, &benchmark_points);

    let mut dates = Vec::with_capacity(all_dates.len());
    let mut tracked_values = Vec::with_capacity(all_dates.len());
    let mut benchmark_values = Vec::with_capacity(all_dates.len());

    for ((date, t), b) in all_dates.iter().zip(tracked_filled).zip(benchmark_filled) {
        if let (Some(t), Some(b)) = (t, b) {
            dates.push(*date);
            tracked_values.push(t);
            benchmark_values.push(b);
        }
    }

    if dates.is_empty() {
        return Err(Error::DataUnavailable(
            "downloaded data has no rows after cleaning".to_string(),
        ));
    }

    // Normalization divides by the first close
    for (ticker, first) in [(&tracked, tracked_values[0]), (&benchmark, benchmark_values[0])] {
        if first <= 0.0 {
            return Err(Error::DataUnavailable(format!(
                "{ticker} starts on a non-positive close ({first}) on {}",
                dates[0]
            )));
        }
    }

    debug!(
        tracked = %tracked,
        benchmark = %benchmark,
        raw_dates = all_dates.len(),
        rows = dates.len(),
        "aligned price table"
    );

    Ok(PriceTable {
        dates,
        tracked: PriceColumn::new(&tracked, tracked_values),
        benchmark: PriceColumn::new(&benchmark, benchmark_values),
    })
}

/// Index a raw series by date. Non-finite closes count as missing; for a
/// repeated date the later point wins.
fn closes_by_date(series: &RawSeries) -> BTreeMap<NaiveDate, Option<f64>> {
    series
        .points
        .iter()
        .map(|(date, close)| (*date, close.filter(|c| c.is_finite())))
        .collect()
}

fn forward_fill(
    dates: &BTreeSet<NaiveDate>,
    points: &BTreeMap<NaiveDate, Option<f64>>,
) -> Vec<Option<f64>> {
    let mut last = None;
    dates
        .iter()
        .map(|date| {
            if let Some(Some(close)) = points.get(date) {
                last = Some(*close);
            }
            last
        })
        .collect()
}

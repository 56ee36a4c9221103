//! Yahoo Finance chart API source.

use super::PriceSource;
use crate::types::{DateRange, RawPriceTable, RawSeries};
use crate::{Error, Result};
use chrono::{DateTime, Days, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Public chart API host.
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Daily closes from `/v8/finance/chart/{ticker}`.
///
/// Adjusted closes are used when the response carries them. A ticker whose
/// request or payload fails is left out of the result.
#[derive(Debug, Clone)]
pub struct YahooPriceSource {
    client: Client,
    base_url: String,
}

impl YahooPriceSource {
    /// Create a source against `base_url` with a request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, ticker: &str, range: &DateRange) -> String {
        // period2 is exclusive upstream
        let period1 = midnight_timestamp(range.start);
        let period2 = range
            .end
            .checked_add_days(Days::new(1))
            .map(midnight_timestamp)
            .unwrap_or(i64::MAX);

        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url, ticker, period1, period2
        )
    }

    fn fetch_one(&self, ticker: &str, range: &DateRange) -> Result<RawSeries> {
        let url = self.chart_url(ticker, range);
        debug!(ticker, %url, "requesting chart");

        let response = self.client.get(&url).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(Error::Source(format!(
                "yahoo returned HTTP {} for {ticker}",
                status.as_u16()
            )));
        }

        let mut series = parse_chart_response(ticker, &body)?;
        series.points.retain(|(date, _)| range.contains(*date));
        Ok(series)
    }
}

impl PriceSource for YahooPriceSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch_closes(&self, tickers: &[String], range: &DateRange) -> Result<RawPriceTable> {
        let mut table = RawPriceTable::new();

        for ticker in tickers {
            match self.fetch_one(ticker, range) {
                Ok(series) => {
                    debug!(ticker = %ticker, points = series.points.len(), "fetched closes");
                    table.insert(series);
                }
                Err(e) => warn!(ticker = %ticker, error = %e, "no price data for ticker"),
            }
        }

        Ok(table)
    }
}

fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Parse a chart API response body into a raw series.
///
/// Bar timestamps are shifted by the exchange's `gmtoffset` before taking
/// the calendar date.
pub fn parse_chart_response(ticker: &str, body: &str) -> Result<RawSeries> {
    let response: YahooChartResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error {
        return Err(Error::Source(format!(
            "yahoo chart error for {ticker}: {} ({})",
            error.description.unwrap_or_default(),
            error.code.unwrap_or_default()
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| Error::Source(format!("no chart data for {ticker}")))?;

    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();

    let adjusted = result
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .map(|a| a.adjclose);
    let closes = match adjusted {
        Some(closes) => closes,
        None => result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default(),
    };

    let mut series = RawSeries::new(ticker);
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(date) = ts
            .checked_add(offset)
            .and_then(|local| DateTime::from_timestamp(local, 0))
            .map(|dt| dt.date_naive())
        else {
            continue;
        };
        series.push(date, closes.get(i).copied().flatten());
    }

    Ok(series)
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: Option<YahooChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
    #[serde(default)]
    adjclose: Option<Vec<YahooAdjClose>>,
}

#[derive(Debug, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

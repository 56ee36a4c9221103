//! Request flow: resolve fund, compute window, fetch prices, analyze.

use crate::engine::{analyze, AnalysisConfig, AnalysisReport};
use crate::horizon::Horizon;
use crate::registry::FundRegistry;
use crate::report::ChartSpec;
use crate::source::PriceSource;
use crate::types::DateRange;
use crate::Result;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A user selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRequest {
    /// Fund ticker from the registry
    pub ticker: String,
    pub horizon: Horizon,
    /// Window end date; today's local date when `None`
    pub as_of: Option<NaiveDate>,
}

impl DashboardRequest {
    /// Request for `ticker` over `horizon`, ending today.
    pub fn new(ticker: &str, horizon: Horizon) -> Self {
        Self {
            ticker: ticker.to_string(),
            horizon,
            as_of: None,
        }
    }

    /// End the window on a fixed date.
    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }
}

/// Everything the presentation layer needs for one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardReport {
    pub horizon: Horizon,
    /// Requested fetch window
    pub range: DateRange,
    /// Price source name
    pub source: String,
    pub analysis: AnalysisReport,
    pub chart: ChartSpec,
}

/// Read-only wiring of registry, price source, and analysis parameters.
pub struct Dashboard {
    registry: FundRegistry,
    source: Box<dyn PriceSource>,
    config: AnalysisConfig,
}

impl Dashboard {
    /// Create a dashboard.
    pub fn new(registry: FundRegistry, source: Box<dyn PriceSource>, config: AnalysisConfig) -> Self {
        Self {
            registry,
            source,
            config,
        }
    }

    /// The fund registry.
    pub fn registry(&self) -> &FundRegistry {
        &self.registry
    }

    /// Run one request end to end.
    pub fn run(&self, request: &DashboardRequest) -> Result<DashboardReport> {
        let fund = self.registry.lookup(&request.ticker)?;
        let today = request
            .as_of
            .unwrap_or_else(|| Local::now().date_naive());
        let range = request.horizon.date_range(today)?;

        info!(
            ticker = %fund.ticker,
            benchmark = %fund.benchmark_ticker,
            source = self.source.name(),
            "fetching data from {} to {}",
            range.start,
            range.end
        );

        let raw = self.source.fetch_closes(&fund.tickers(), &range)?;
        let analysis = analyze(fund, &raw, &self.config)?;
        let chart = ChartSpec::from_analysis(&analysis, request.horizon);

        Ok(DashboardReport {
            horizon: request.horizon,
            range,
            source: self.source.name().to_string(),
            analysis,
            chart,
        })
    }
}

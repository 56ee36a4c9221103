//! Request-scoped analytics entry point.
//!
//! One call runs the whole compute pass for a fund and its benchmark:
//! align, normalize, then whichever snapshots the `OutputSelection` asks for.

use crate::analytics::{
    align_and_clean, normalize, risk_metrics_with, snapshot_returns, RiskParameters,
};
use crate::types::{FundListing, NormalizedSeries, RawPriceTable, ReturnSnapshot, RiskSnapshot};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Display label of the benchmark column and return figure.
pub const BENCHMARK_LABEL: &str = "Benchmark";

/// Which derived figures to compute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSelection {
    /// Compute the return snapshot
    pub returns: bool,
    /// Compute the fund risk snapshot
    pub risk: bool,
}

impl OutputSelection {
    /// Returns and risk.
    pub const fn all() -> Self {
        Self {
            returns: true,
            risk: true,
        }
    }

    /// Return snapshot only.
    pub const fn returns_only() -> Self {
        Self {
            returns: true,
            risk: false,
        }
    }

    /// Risk snapshot only.
    pub const fn risk_only() -> Self {
        Self {
            returns: false,
            risk: true,
        }
    }
}

impl Default for OutputSelection {
    fn default() -> Self {
        Self::all()
    }
}

/// Parameters for one analysis request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    #[serde(flatten)]
    pub risk_params: RiskParameters,
    #[serde(flatten)]
    pub outputs: OutputSelection,
}

/// Outcome of the risk step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RiskSection {
    Computed(RiskSnapshot),
    /// Too little history; the rest of the report is still valid
    Unavailable { reason: String },
    /// Not requested
    Skipped,
}

impl RiskSection {
    /// The snapshot, if computed.
    pub fn snapshot(&self) -> Option<&RiskSnapshot> {
        match self {
            RiskSection::Computed(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// Engine output for one fund and its benchmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    /// Registry row the request was for
    pub fund: FundListing,
    /// Base-100 series for charting
    pub normalized: NormalizedSeries,
    /// Present when `OutputSelection::returns` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<ReturnSnapshot>,
    pub risk: RiskSection,
}

/// Run the analytics for `fund` over raw price data.
///
/// Missing data fails the whole request with `Error::DataUnavailable`.
/// Insufficient history only affects the risk section.
pub fn analyze(
    fund: &FundListing,
    raw: &RawPriceTable,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    let table = align_and_clean(raw, &fund.tickers())?.with_labels(&fund.name, BENCHMARK_LABEL);
    let normalized = normalize(&table);

    let returns = config
        .outputs
        .returns
        .then(|| snapshot_returns(&normalized));

    let risk = if config.outputs.risk {
        match risk_metrics_with(&table.tracked.values, &config.risk_params) {
            Ok(snapshot) => RiskSection::Computed(snapshot),
            Err(e @ Error::InsufficientHistory(_)) => {
                warn!(ticker = %fund.ticker, error = %e, "skipping risk metrics");
                RiskSection::Unavailable {
                    reason: e.to_string(),
                }
            }
            Err(e) => return Err(e),
        }
    } else {
        RiskSection::Skipped
    };

    debug!(ticker = %fund.ticker, rows = normalized.len(), "analysis complete");

    Ok(AnalysisReport {
        fund: fund.clone(),
        normalized,
        returns,
        risk,
    })
}

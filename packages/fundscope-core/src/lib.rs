//! Fundscope Core - Fund vs benchmark performance and risk analytics.
//!
//! This crate provides the pieces behind the `fundscope` dashboard:
//!
//! - **Registry**: Fund to benchmark mapping loaded from CSV
//! - **Horizons**: YTD / 1Y / 3Y / 5Y date-range arithmetic
//! - **Price sources**: Yahoo chart API, wide CSV files, in-memory tables
//! - **Analytics**: Alignment, base-100 normalization, return snapshot,
//!   volatility, max drawdown, historical VaR
//! - **Reports**: Text rendering and long-form chart data
//!
//! # Example
//!
//! ```rust
//! use fundscope_core::analytics::risk_metrics;
//!
//! let risk = risk_metrics(&[100.0, 110.0, 99.0, 121.0]).unwrap();
//! assert!(risk.max_drawdown_percent <= 0.0);
//! println!("Annualized volatility: {:.2}%", risk.volatility_percent);
//! ```

pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod horizon;
pub mod registry;
pub mod report;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use types::{
    ApiResponse, DateRange, FundListing, InstrumentSeries, NormalizedSeries, PriceTable,
    RawPriceTable, RawSeries, ReturnFigure, ReturnSnapshot, RiskSnapshot,
};

// Re-export main functionality
pub use analytics::{align_and_clean, normalize, risk_metrics, snapshot_returns};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardRequest};
pub use engine::{analyze, AnalysisConfig, AnalysisReport, OutputSelection, RiskSection};
pub use horizon::Horizon;
pub use registry::FundRegistry;
pub use source::{CsvPriceSource, PriceSource, StaticPriceSource, YahooPriceSource};

/// Error types for fundscope-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Insufficient history: {0}")]
    InsufficientHistory(String),

    #[error("Fund not found: {0}")]
    FundNotFound(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Price source error: {0}")]
    Source(String),
}

/// Result type for fundscope-core operations.
pub type Result<T> = std::result::Result<T, Error>;

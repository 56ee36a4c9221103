//! Performance and risk analytics.
//!
//! Pure transforms over a two-instrument daily price table:
//!
//! - **Alignment**: Forward-fill and drop incomplete rows
//! - **Performance**: Base-100 normalization and return snapshot
//! - **Risk**: Annualized volatility, max drawdown, historical VaR

mod align;
mod performance;
mod risk;

pub use align::align_and_clean;
pub use performance::{normalize, returns_from_prices, round2, snapshot_returns};
pub use risk::{
    annualized_volatility, daily_returns, historical_var, max_drawdown, percentile_linear,
    risk_metrics, risk_metrics_with, sample_std_dev, RiskParameters, DEFAULT_VAR_CONFIDENCE,
    TRADING_DAYS_PER_YEAR,
};

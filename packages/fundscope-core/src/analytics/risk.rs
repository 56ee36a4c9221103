//! Fund risk metrics calculation.
//!
//! Provides annualized volatility, maximum drawdown, and historical VaR
//! computed from a daily closing price series.

use crate::types::RiskSnapshot;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Trading days used to annualize daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Confidence level of the 1-day historical VaR.
pub const DEFAULT_VAR_CONFIDENCE: f64 = 0.95;

/// Parameters of the risk transform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskParameters {
    /// Periods per year used to annualize volatility
    pub periods_per_year: f64,
    /// VaR confidence level (0.95 reads the 5th percentile of returns)
    pub var_confidence: f64,
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            periods_per_year: TRADING_DAYS_PER_YEAR,
            var_confidence: DEFAULT_VAR_CONFIDENCE,
        }
    }
}

/// Calculate risk metrics for a price series using the default parameters
/// (252 trading days, 95% VaR).
///
/// # Arguments
///
/// * `prices` - Daily closing prices in date order (not normalized)
///
/// # Returns
///
/// Returns `RiskSnapshot`, or `Error::InsufficientHistory` for fewer than 2 prices.
pub fn risk_metrics(prices: &[f64]) -> Result<RiskSnapshot> {
    risk_metrics_with(prices, &RiskParameters::default())
}

/// Calculate risk metrics for a price series with explicit parameters.
///
/// With exactly two prices there is a single return observation; its sample
/// standard deviation is undefined and volatility is reported as 0.
pub fn risk_metrics_with(prices: &[f64], params: &RiskParameters) -> Result<RiskSnapshot> {
    if prices.len() < 2 {
        return Err(Error::InsufficientHistory(format!(
            "need at least 2 prices for risk calculation, got {}",
            prices.len()
        )));
    }

    if let Some(bad) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
        return Err(Error::InvalidRequest(format!(
            "prices must be positive and finite, got {bad}"
        )));
    }

    if !(params.var_confidence > 0.0 && params.var_confidence < 1.0) {
        return Err(Error::InvalidRequest(format!(
            "VaR confidence must be between 0 and 1, got {}",
            params.var_confidence
        )));
    }

    if !(params.periods_per_year > 0.0 && params.periods_per_year.is_finite()) {
        return Err(Error::InvalidRequest(format!(
            "periods per year must be positive, got {}",
            params.periods_per_year
        )));
    }

    let returns = daily_returns(prices);

    let snapshot = RiskSnapshot {
        volatility_percent: annualized_volatility(&returns, params.periods_per_year),
        max_drawdown_percent: max_drawdown(&returns),
        var_percent: historical_var(&returns, params.var_confidence),
        var_confidence: params.var_confidence,
        observations: returns.len(),
    };

    debug!(
        observations = snapshot.observations,
        volatility = snapshot.volatility_percent,
        max_drawdown = snapshot.max_drawdown_percent,
        var = snapshot.var_percent,
        "computed risk metrics"
    );

    Ok(snapshot)
}

/// Simple daily returns: `p[i] / p[i-1] - 1`.
pub fn daily_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Sample standard deviation (divisor `n - 1`). `None` for fewer than 2 values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Some(variance.sqrt())
}

/// Calculate annualized volatility percentage from daily returns.
///
/// Returns 0 when fewer than 2 return observations exist.
pub fn annualized_volatility(returns: &[f64], periods_per_year: f64) -> f64 {
    sample_std_dev(returns)
        .map(|std| std * periods_per_year.sqrt() * 100.0)
        .unwrap_or(0.0)
}

/// Calculate maximum drawdown percentage from daily returns.
///
/// Drawdown is measured against the running peak of the cumulative growth
/// factor, starting from the first return. The result is zero or negative
/// (e.g. -15.0 for a 15% peak-to-trough decline).
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut growth = 1.0;
    let mut running_max = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for r in returns {
        growth *= 1.0 + r;
        running_max = running_max.max(growth);
        let drawdown = (growth - running_max) / running_max;
        worst = worst.min(drawdown);
    }

    worst * 100.0
}

/// Percentile with linear interpolation between order statistics.
///
/// Position `q * (n - 1)` in the sorted sample; the same convention as
/// numpy's default `linear` method. `q` is clamped to `[0, 1]`.
pub fn percentile_linear(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Calculate 1-day historical Value at Risk as a return percentage.
///
/// The `1 - confidence` percentile of daily returns, so a 95% VaR is the 5th
/// percentile. Typically negative (a loss). Returns 0 for no returns.
pub fn historical_var(returns: &[f64], confidence: f64) -> f64 {
    percentile_linear(returns, 1.0 - confidence)
        .map(|p| p * 100.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const PRICES: [f64; 4] = [100.0, 110.0, 99.0, 121.0];

    #[test]
    fn test_daily_returns() {
        let returns = daily_returns(&PRICES);

        assert_eq!(returns.len(), 3);
        assert_abs_diff_eq!(returns[0], 0.10, epsilon = 1e-12);
        assert_abs_diff_eq!(returns[1], -0.10, epsilon = 1e-12);
        assert_abs_diff_eq!(returns[2], 2.0 / 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_risk_metrics_closed_form() {
        let risk = risk_metrics(&PRICES).unwrap();

        // Returns 0.1, -0.1, 2/9; mean 2/27
        // Deviations 0.7/27, -4.7/27, 4/27 -> sum of squares 38.58 / 729
        // Sample variance 19.29 / 729 -> std sqrt(19.29) / 27
        let expected_vol = 19.29_f64.sqrt() / 27.0 * 252.0_f64.sqrt() * 100.0;
        assert_abs_diff_eq!(risk.volatility_percent, expected_vol, epsilon = 1e-6);

        // Growth 1.1, 0.99, 1.21; worst (0.99 - 1.1) / 1.1 = -10%
        assert_abs_diff_eq!(risk.max_drawdown_percent, -10.0, epsilon = 1e-6);

        // Sorted -0.1, 0.1, 2/9; position 0.05 * 2 = 0.1 -> -0.1 + 0.1 * 0.2 = -0.08
        assert_abs_diff_eq!(risk.var_percent, -8.0, epsilon = 1e-6);

        assert_eq!(risk.observations, 3);
        assert_eq!(risk.var_confidence, 0.95);
    }

    #[test]
    fn test_risk_metrics_single_point_is_insufficient() {
        let result = risk_metrics(&[100.0]);
        assert!(matches!(result, Err(Error::InsufficientHistory(_))));

        let result = risk_metrics(&[]);
        assert!(matches!(result, Err(Error::InsufficientHistory(_))));
    }

    #[test]
    fn test_risk_metrics_two_points_zero_volatility() {
        let risk = risk_metrics(&[100.0, 95.0]).unwrap();

        assert_eq!(risk.observations, 1);
        assert_eq!(risk.volatility_percent, 0.0);
        // A single negative return is its own peak
        assert_eq!(risk.max_drawdown_percent, 0.0);
        assert_abs_diff_eq!(risk.var_percent, -5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_risk_metrics_rejects_non_positive_prices() {
        let result = risk_metrics(&[100.0, 0.0, 50.0]);
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn test_risk_metrics_with_custom_parameters() {
        let params = RiskParameters {
            periods_per_year: 52.0,
            var_confidence: 0.5,
        };
        let risk = risk_metrics_with(&PRICES, &params).unwrap();

        let expected_vol = 19.29_f64.sqrt() / 27.0 * 52.0_f64.sqrt() * 100.0;
        assert_abs_diff_eq!(risk.volatility_percent, expected_vol, epsilon = 1e-6);
        // Median of -0.1, 0.1, 2/9
        assert_abs_diff_eq!(risk.var_percent, 10.0, epsilon = 1e-6);

        let bad = RiskParameters {
            var_confidence: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            risk_metrics_with(&PRICES, &bad),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_risk_metrics_rejects_non_positive_periods() {
        for periods_per_year in [0.0, -252.0, f64::NAN] {
            let params = RiskParameters {
                periods_per_year,
                ..Default::default()
            };
            assert!(matches!(
                risk_metrics_with(&PRICES, &params),
                Err(Error::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn test_sample_std_dev() {
        assert_eq!(sample_std_dev(&[]), None);
        assert_eq!(sample_std_dev(&[0.3]), None);

        // Mean 5, squared deviations sum to 32 over 8 values -> 32 / 7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let std = sample_std_dev(&values).unwrap();
        assert_abs_diff_eq!(std, (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_max_drawdown() {
        // Series that goes up, then down significantly
        let returns = vec![0.10, 0.05, -0.15, -0.10, 0.05];

        let mdd = max_drawdown(&returns);

        // Peak 1.155, trough 1.155 * 0.85 * 0.90; drawdown -23.5%
        assert_abs_diff_eq!(mdd, (0.85 * 0.90 - 1.0) * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_max_drawdown_non_decreasing_is_zero() {
        let prices = [10.0, 10.0, 10.5, 11.0, 11.0, 12.3];
        assert_eq!(max_drawdown(&daily_returns(&prices)), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn test_max_drawdown_never_positive() {
        let series: [&[f64]; 4] = [
            &[100.0, 90.0, 80.0, 70.0],
            &[5.0, 7.0, 6.0, 9.0, 3.0, 4.0],
            &[1.0, 1.01, 0.99, 1.02],
            &PRICES,
        ];

        for prices in series {
            let mdd = max_drawdown(&daily_returns(prices));
            assert!(mdd <= 0.0, "drawdown {mdd} for {prices:?}");
            assert!(mdd >= -100.0);
        }
    }

    #[test]
    fn test_percentile_linear() {
        assert_eq!(percentile_linear(&[], 0.5), None);
        assert_eq!(percentile_linear(&[3.0], 0.05), Some(3.0));

        let values = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(percentile_linear(&values, 0.0), Some(1.0));
        assert_eq!(percentile_linear(&values, 1.0), Some(5.0));
        assert_eq!(percentile_linear(&values, 0.5), Some(3.0));
        // Position 0.25 * 4 = 1 exactly
        assert_eq!(percentile_linear(&values, 0.25), Some(2.0));
        // Position 0.1 * 4 = 0.4
        assert_abs_diff_eq!(percentile_linear(&values, 0.1).unwrap(), 1.4, epsilon = 1e-12);
    }

    #[test]
    fn test_historical_var_twenty_observations() {
        // Position 0.05 * 19 = 0.95 between the two worst returns
        let mut returns: Vec<f64> = (0..18).map(|i| 0.001 * i as f64).collect();
        returns.push(-0.03);
        returns.push(-0.02);

        let var = historical_var(&returns, 0.95);
        assert_abs_diff_eq!(var, (-0.03 + 0.95 * 0.01) * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_risk_metrics_is_idempotent() {
        let prices = [37.41, 38.02, 36.77, 39.15, 38.88, 40.02];
        let a = risk_metrics(&prices).unwrap();
        let b = risk_metrics(&prices).unwrap();

        assert_eq!(a.volatility_percent.to_bits(), b.volatility_percent.to_bits());
        assert_eq!(a.max_drawdown_percent.to_bits(), b.max_drawdown_percent.to_bits());
        assert_eq!(a.var_percent.to_bits(), b.var_percent.to_bits());
    }
}

//! Base-100 normalization and point-in-time returns.

use crate::types::{NormalizedSeries, PriceColumn, PriceTable, ReturnFigure, ReturnSnapshot};

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rescale each instrument so its first value is exactly 100.
///
/// The first value of every column must be positive; `align_and_clean`
/// guarantees this and that the table is non-empty.
pub fn normalize(table: &PriceTable) -> NormalizedSeries {
    NormalizedSeries {
        dates: table.dates.clone(),
        tracked: rebase(&table.tracked),
        benchmark: rebase(&table.benchmark),
    }
}

fn rebase(column: &PriceColumn) -> PriceColumn {
    let values = match column.first() {
        Some(base) => {
            debug_assert!(base > 0.0, "{}: first price must be positive", column.ticker);
            column.values.iter().map(|v| v / base * 100.0).collect()
        }
        None => Vec::new(),
    };

    PriceColumn {
        ticker: column.ticker.clone(),
        label: column.label.clone(),
        values,
    }
}

/// Return of each instrument over the window: last normalized value minus 100.
pub fn snapshot_returns(normalized: &NormalizedSeries) -> ReturnSnapshot {
    let figure = |column: &PriceColumn| ReturnFigure {
        ticker: column.ticker.clone(),
        label: column.label.clone(),
        percent: round2(column.last().unwrap_or(100.0) - 100.0),
    };

    ReturnSnapshot {
        tracked: figure(&normalized.tracked),
        benchmark: figure(&normalized.benchmark),
    }
}

/// Return in percent straight from raw prices: `(last - first) / first * 100`.
///
/// Rounded the same way as `snapshot_returns`. Returns 0 for an empty slice or a
/// non-positive first price.
pub fn returns_from_prices(prices: &[f64]) -> f64 {
    match (prices.first(), prices.last()) {
        (Some(&first), Some(&last)) if first > 0.0 => round2((last - first) / first * 100.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn table(tracked: Vec<f64>, benchmark: Vec<f64>) -> PriceTable {
        let dates = (0..tracked.len())
            .map(|i| NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Days::new(i as u64))
            .collect();
        PriceTable {
            dates,
            tracked: PriceColumn::new("FUND", tracked),
            benchmark: PriceColumn::new("IDX", benchmark),
        }
        .with_labels("Test Fund", "Benchmark")
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(-1.236), -1.24);
        assert_eq!(round2(21.0000000001), 21.0);
        // Half away from zero
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
    }

    #[test]
    fn test_normalize_starts_at_100() {
        let samples = [
            (vec![37.41, 38.2, 36.9], vec![4781.58, 4800.0, 4700.5]),
            (vec![0.0173, 0.02], vec![1.0e6, 2.0e6]),
            (vec![123.456], vec![7.89]),
        ];

        for (t, b) in samples {
            let normalized = normalize(&table(t, b));
            for column in normalized.columns() {
                assert_eq!(column.values[0], 100.0);
            }
        }
    }

    #[test]
    fn test_normalize_preserves_shape_and_labels() {
        let normalized = normalize(&table(vec![50.0, 55.0, 45.0], vec![200.0, 210.0, 190.0]));

        assert_eq!(normalized.len(), 3);
        assert_eq!(normalized.tracked.label, "Test Fund");
        assert_eq!(normalized.benchmark.label, "Benchmark");
        assert_abs_diff_eq!(normalized.tracked.values[1], 110.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalized.tracked.values[2], 90.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalized.benchmark.values[1], 105.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalized.benchmark.values[2], 95.0, epsilon = 1e-12);
    }

    #[test]
    fn test_snapshot_returns() {
        let normalized = normalize(&table(
            vec![100.0, 110.0, 99.0, 121.0],
            vec![50.0, 49.0, 51.0, 52.5],
        ));
        let snapshot = snapshot_returns(&normalized);

        assert_eq!(snapshot.tracked.percent, 21.0);
        assert_eq!(snapshot.benchmark.percent, 5.0);
        assert_eq!(snapshot.get("Test Fund"), Some(21.0));
        assert_eq!(snapshot.get("Benchmark"), Some(5.0));
    }

    #[test]
    fn test_snapshot_matches_direct_form() {
        let series = [
            vec![100.0, 110.0, 99.0, 121.0],
            vec![37.41, 38.02, 36.77, 39.15],
            vec![412.7, 398.1, 377.35],
            vec![0.9731, 1.0044, 1.1117, 1.0892],
            vec![18.0, 18.0],
            vec![263.11, 251.9, 249.07, 230.4],
        ];

        for prices in series {
            let normalized = normalize(&table(prices.clone(), prices.clone()));
            let snapshot = snapshot_returns(&normalized);
            assert_abs_diff_eq!(
                snapshot.tracked.percent,
                returns_from_prices(&prices),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_returns_from_prices_degenerate() {
        assert_eq!(returns_from_prices(&[]), 0.0);
        assert_eq!(returns_from_prices(&[42.0]), 0.0);
        assert_eq!(returns_from_prices(&[0.0, 5.0]), 0.0);
        assert_eq!(returns_from_prices(&[80.0, 60.0]), -25.0);
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let t = table(vec![37.41, 38.02, 36.77], vec![4781.58, 4799.1, 4812.66]);
        let a = snapshot_returns(&normalize(&t));
        let b = snapshot_returns(&normalize(&t));

        assert_eq!(a.tracked.percent.to_bits(), b.tracked.percent.to_bits());
        assert_eq!(a.benchmark.percent.to_bits(), b.benchmark.percent.to_bits());
    }
}

//! Presentation of dashboard results: text summary and chart data.

use crate::dashboard::DashboardReport;
use crate::engine::{AnalysisReport, RiskSection, BENCHMARK_LABEL};
use crate::horizon::Horizon;
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::Write;

/// Y-axis label of the comparison chart.
pub const CHART_Y_LABEL: &str = "Normalized Value (Start = 100)";

/// One point of the long-form chart table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Normalized Price")]
    pub value: f64,
}

/// Line chart of both normalized series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub y_label: String,
    /// Points grouped by ticker (tracked first), each group in date order
    pub points: Vec<ChartPoint>,
}

impl ChartSpec {
    /// Build the chart for an analysis over `horizon`.
    pub fn from_analysis(analysis: &AnalysisReport, horizon: Horizon) -> Self {
        let fund = &analysis.fund;
        let normalized = &analysis.normalized;

        let points = normalized
            .columns()
            .into_iter()
            .flat_map(|column| {
                normalized
                    .dates
                    .iter()
                    .zip(&column.values)
                    .map(move |(date, value)| ChartPoint {
                        date: *date,
                        ticker: column.ticker.clone(),
                        value: *value,
                    })
            })
            .collect();

        Self {
            title: format!(
                "{} ({}) vs {} ({}) - {}",
                fund.name, fund.ticker, fund.benchmark_name, fund.benchmark_ticker, horizon
            ),
            y_label: CHART_Y_LABEL.to_string(),
            points,
        }
    }

    /// Write the points as CSV with `Date,Ticker,Normalized Price` columns.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for point in &self.points {
            writer.serialize(point)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Render a report as plain text.
pub fn render_text(report: &DashboardReport) -> String {
    let analysis = &report.analysis;
    let fund = &analysis.fund;
    let mut out = String::new();

    let _ = writeln!(out, "{} ({})", fund.name, fund.ticker);
    let _ = writeln!(
        out,
        "Benchmark: {} ({})",
        fund.benchmark_name, fund.benchmark_ticker
    );
    let _ = writeln!(
        out,
        "Horizon: {} ({} to {})",
        report.horizon, report.range.start, report.range.end
    );

    if let Some(returns) = &analysis.returns {
        let _ = writeln!(out, "\nPerformance Snapshot");
        let _ = writeln!(
            out,
            "  {:<40} {:>10}",
            format!("{} ({})", returns.tracked.label, returns.tracked.ticker),
            percent(returns.tracked.percent)
        );
        let _ = writeln!(
            out,
            "  {:<40} {:>10}",
            format!("{} ({})", BENCHMARK_LABEL, returns.benchmark.ticker),
            percent(returns.benchmark.percent)
        );
    }

    match &analysis.risk {
        RiskSection::Computed(risk) => {
            let _ = writeln!(out, "\nRisk Metrics ({})", fund.ticker);
            let _ = writeln!(
                out,
                "  {:<40} {:>10}",
                "Annualized Volatility",
                percent(risk.volatility_percent)
            );
            let _ = writeln!(
                out,
                "  {:<40} {:>10}",
                "Max Drawdown",
                percent(risk.max_drawdown_percent)
            );
            let _ = writeln!(
                out,
                "  {:<40} {:>10}",
                format!("1-Day VaR ({:.0}%)", risk.var_confidence * 100.0),
                percent(risk.var_percent)
            );
        }
        RiskSection::Unavailable { reason } => {
            let _ = writeln!(out, "\nRisk Metrics ({}): {}", fund.ticker, reason);
        }
        RiskSection::Skipped => {}
    }

    if let (Some(first), Some(last)) = (
        analysis.normalized.dates.first(),
        analysis.normalized.dates.last(),
    ) {
        let _ = writeln!(
            out,
            "\n{} trading days, {} to {}",
            analysis.normalized.len(),
            first,
            last
        );
    }

    out
}

fn percent(value: f64) -> String {
    format!("{value:.2}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{analyze, AnalysisConfig, OutputSelection};
    use crate::types::{DateRange, FundListing, RawPriceTable, RawSeries};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn report(config: AnalysisConfig, fund_prices: &[f64]) -> DashboardReport {
        let fund = FundListing::new("FUND", "IDX", "Test Growth Fund", "Test Index");
        let dates: Vec<NaiveDate> = (0..fund_prices.len()).map(|i| date(i as u32 + 2)).collect();
        let raw = RawPriceTable::new()
            .with_series(RawSeries::from_closes(
                "FUND",
                dates.iter().copied().zip(fund_prices.iter().copied()),
            ))
            .with_series(RawSeries::from_closes(
                "IDX",
                dates.iter().copied().zip([50.0, 51.0, 52.0, 55.0]),
            ));

        let analysis = analyze(&fund, &raw, &config).unwrap();
        DashboardReport {
            horizon: Horizon::Ytd,
            range: DateRange::new(date(1), date(15)).unwrap(),
            source: "static".to_string(),
            chart: ChartSpec::from_analysis(&analysis, Horizon::Ytd),
            analysis,
        }
    }

    #[test]
    fn test_chart_spec_long_form() {
        let report = report(AnalysisConfig::default(), &[100.0, 110.0, 99.0, 121.0]);
        let chart = &report.chart;

        assert_eq!(
            chart.title,
            "Test Growth Fund (FUND) vs Test Index (IDX) - YTD"
        );
        assert_eq!(chart.y_label, CHART_Y_LABEL);
        assert_eq!(chart.points.len(), 8);
        assert_eq!(chart.points[0].ticker, "FUND");
        assert_eq!(chart.points[0].value, 100.0);
        assert_eq!(chart.points[4].ticker, "IDX");
        assert_eq!(chart.points[4].date, date(2));
        assert_eq!(chart.points[4].value, 100.0);
    }

    #[test]
    fn test_chart_csv_export() {
        let report = report(AnalysisConfig::default(), &[100.0, 110.0, 99.0, 121.0]);

        let mut buffer = Vec::new();
        report.chart.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,Ticker,Normalized Price");
        assert_eq!(lines[1], "2026-01-02,FUND,100.0");
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn test_render_text_full() {
        let report = report(AnalysisConfig::default(), &[100.0, 110.0, 99.0, 121.0]);
        let text = render_text(&report);

        assert!(text.starts_with("Test Growth Fund (FUND)\nBenchmark: Test Index (IDX)\n"));
        assert!(text.contains("Horizon: YTD (2026-01-01 to 2026-01-15)"));
        assert!(text.contains("Performance Snapshot"));
        assert!(text.contains("21.00%"));
        assert!(text.contains("Benchmark (IDX)"));
        assert!(text.contains("10.00%"));
        assert!(text.contains("Max Drawdown"));
        assert!(text.contains("-10.00%"));
        assert!(text.contains("1-Day VaR (95%)"));
        assert!(text.contains("-8.00%"));
        assert!(text.contains("4 trading days, 2026-01-02 to 2026-01-05"));
    }

    #[test]
    fn test_render_text_returns_only() {
        let config = AnalysisConfig {
            outputs: OutputSelection::returns_only(),
            ..Default::default()
        };
        let text = render_text(&report(config, &[100.0, 110.0, 99.0, 121.0]));

        assert!(text.contains("Performance Snapshot"));
        assert!(!text.contains("Risk Metrics"));
    }
}

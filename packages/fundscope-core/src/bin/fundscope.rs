//! Fundscope CLI - Compare a mutual fund against its benchmark.
//!
//! JSON output by default; `--format text` prints a readable summary.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fundscope_core::{
    config::DashboardConfig, report::render_text, source::CsvPriceSource, ApiResponse, Dashboard,
    DashboardRequest, FundRegistry, Horizon, OutputSelection, PriceSource,
};
use serde::Serialize;
use serde_json::json;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "fundscope")]
#[command(about = "Mutual fund vs benchmark performance and risk")]
#[command(version)]
struct Cli {
    /// Config file (default: $FUNDSCOPE_CONFIG or ~/.fundscope/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fund registry CSV, overrides the config file
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Read prices from a wide CSV file instead of the configured source
    #[arg(long, global = true)]
    prices: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// List funds in the registry
    Funds,
    /// Compare a fund with its benchmark
    Compare {
        #[command(flatten)]
        selection: Selection,
        /// Only compute the return snapshot
        #[arg(long, conflicts_with = "risk_only")]
        returns_only: bool,
        /// Only compute the risk snapshot
        #[arg(long)]
        risk_only: bool,
    },
    /// Export normalized series as long-form CSV for charting
    Chart {
        #[command(flatten)]
        selection: Selection,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the date range of a horizon
    Horizon {
        #[arg(long, default_value = "YTD")]
        horizon: Horizon,
        /// End date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
}

#[derive(Args)]
struct Selection {
    /// Fund ticker (defaults to the first registry row)
    #[arg(short, long)]
    ticker: Option<String>,
    /// YTD, 1Y, 3Y or 5Y
    #[arg(long, default_value = "YTD")]
    horizon: Horizon,
    /// End date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("FUNDSCOPE_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let format = cli.format;

    match run(cli) {
        Ok(Some(output)) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            match format {
                Format::Json => println!("{}", to_json(&ApiResponse::<()>::err(format!("{e:#}")))),
                Format::Text => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Option<String>> {
    let config_path = cli.config.clone().unwrap_or_else(DashboardConfig::default_path);
    let mut config = DashboardConfig::load_from_path(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    if let Some(registry) = &cli.registry {
        config.registry_path = registry.clone();
    }

    match cli.command {
        Commands::Horizon { horizon, as_of } => {
            let today = as_of.unwrap_or_else(|| Local::now().date_naive());
            let range = horizon.date_range(today)?;
            Ok(Some(match cli.format {
                Format::Json => to_json(&ApiResponse::ok(json!({
                    "horizon": horizon,
                    "start": range.start,
                    "end": range.end,
                }))),
                Format::Text => format!("{horizon}: {} to {}", range.start, range.end),
            }))
        }
        Commands::Funds => {
            let registry = load_registry(&config)?;
            Ok(Some(match cli.format {
                Format::Json => to_json(&ApiResponse::ok(json!({
                    "funds": registry.listings(),
                }))),
                Format::Text => registry
                    .listings()
                    .iter()
                    .map(|l| {
                        format!(
                            "{:<8} {:<8} {} / {}",
                            l.ticker, l.benchmark_ticker, l.name, l.benchmark_name
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
            }))
        }
        Commands::Compare {
            selection,
            returns_only,
            risk_only,
        } => {
            if returns_only {
                config.analysis.outputs = OutputSelection::returns_only();
            } else if risk_only {
                config.analysis.outputs = OutputSelection::risk_only();
            }

            let dashboard = build_dashboard(&config, cli.prices.as_ref())?;
            let report = dashboard.run(&selection.request(dashboard.registry()))?;

            Ok(Some(match cli.format {
                Format::Json => to_json(&ApiResponse::ok(&report)),
                Format::Text => render_text(&report),
            }))
        }
        Commands::Chart { selection, output } => {
            let dashboard = build_dashboard(&config, cli.prices.as_ref())?;
            let report = dashboard.run(&selection.request(dashboard.registry()))?;

            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    report.chart.write_csv(file)?;
                    tracing::info!(path = %path.display(), points = report.chart.points.len(), "wrote chart data");
                    Ok(None)
                }
                None => {
                    report.chart.write_csv(io::stdout().lock())?;
                    Ok(None)
                }
            }
        }
    }
}

impl Selection {
    fn request(&self, registry: &FundRegistry) -> DashboardRequest {
        let ticker = self
            .ticker
            .clone()
            .unwrap_or_else(|| registry.default_listing().ticker.clone());

        DashboardRequest {
            ticker,
            horizon: self.horizon,
            as_of: self.as_of,
        }
    }
}

fn load_registry(config: &DashboardConfig) -> Result<FundRegistry> {
    FundRegistry::load(&config.registry_path)
        .with_context(|| format!("loading registry {}", config.registry_path.display()))
}

fn build_dashboard(config: &DashboardConfig, prices: Option<&PathBuf>) -> Result<Dashboard> {
    let registry = load_registry(config)?;
    let source: Box<dyn PriceSource> = match prices {
        Some(path) => Box::new(CsvPriceSource::new(path.clone())),
        None => config.source.build().context("building price source")?,
    };

    Ok(Dashboard::new(registry, source, config.analysis))
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        format!(r#"{{"ok": false, "error": "serialization failed: {e}"}}"#)
    })
}

//! Dashboard configuration file.
//!
//! ```toml
//! registry_path = "FundsAndBenchmarks.csv"
//!
//! [source]
//! kind = "yahoo"          # or "csv"
//! base_url = "https://query1.finance.yahoo.com"
//! timeout_secs = 10
//! prices_path = "prices.csv"  # required for kind = "csv"
//!
//! [analysis]
//! periods_per_year = 252
//! var_confidence = 0.95
//! returns = true
//! risk = true
//! ```

use crate::engine::AnalysisConfig;
use crate::source::{CsvPriceSource, PriceSource, YahooPriceSource, DEFAULT_YAHOO_BASE_URL};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Fund registry CSV
    pub registry_path: PathBuf,
    /// Where prices come from
    pub source: SourceConfig,
    /// Analytics parameters and output selection
    pub analysis: AnalysisConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from("FundsAndBenchmarks.csv"),
            source: SourceConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

/// Price source kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Yahoo,
    Csv,
}

/// Price source settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Chart API host for the Yahoo source
    pub base_url: String,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
    /// Wide price CSV for the CSV source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prices_path: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Yahoo,
            base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            timeout_secs: 10,
            prices_path: None,
        }
    }
}

impl SourceConfig {
    /// Build the configured price source.
    pub fn build(&self) -> Result<Box<dyn PriceSource>> {
        match self.kind {
            SourceKind::Yahoo => Ok(Box::new(YahooPriceSource::new(
                &self.base_url,
                Duration::from_secs(self.timeout_secs),
            )?)),
            SourceKind::Csv => {
                let path = self.prices_path.as_ref().ok_or_else(|| {
                    Error::InvalidRequest("source.prices_path is required for kind = \"csv\"".into())
                })?;
                Ok(Box::new(CsvPriceSource::new(path.clone())))
            }
        }
    }
}

impl DashboardConfig {
    /// Get the default config file path.
    ///
    /// Default path: `~/.fundscope/config.toml`
    /// Can be overridden with `FUNDSCOPE_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("FUNDSCOPE_CONFIG") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".fundscope/config.toml"))
            .unwrap_or_else(|| PathBuf::from("fundscope.toml"))
    }

    /// Load from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load from a specific path; a missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::OutputSelection;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();

        assert_eq!(config.registry_path, PathBuf::from("FundsAndBenchmarks.csv"));
        assert_eq!(config.source.kind, SourceKind::Yahoo);
        assert_eq!(config.source.base_url, DEFAULT_YAHOO_BASE_URL);
        assert_eq!(config.analysis.risk_params.periods_per_year, 252.0);
        assert_eq!(config.analysis.risk_params.var_confidence, 0.95);
        assert_eq!(config.analysis.outputs, OutputSelection::all());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DashboardConfig::from_toml(
            r#"
registry_path = "/data/funds.csv"

[analysis]
var_confidence = 0.99
risk = false
"#,
        )
        .unwrap();

        assert_eq!(config.registry_path, PathBuf::from("/data/funds.csv"));
        assert_eq!(config.source, SourceConfig::default());
        assert_eq!(config.analysis.risk_params.var_confidence, 0.99);
        assert_eq!(config.analysis.risk_params.periods_per_year, 252.0);
        assert!(config.analysis.outputs.returns);
        assert!(!config.analysis.outputs.risk);
    }

    #[test]
    fn test_csv_source_config() {
        let config = DashboardConfig::from_toml(
            r#"
[source]
kind = "csv"
prices_path = "prices.csv"
"#,
        )
        .unwrap();

        assert_eq!(config.source.kind, SourceKind::Csv);
        let source = config.source.build().unwrap();
        assert_eq!(source.name(), "csv");
    }

    #[test]
    fn test_csv_source_requires_path() {
        let source = SourceConfig {
            kind: SourceKind::Csv,
            ..Default::default()
        };
        assert!(matches!(source.build(), Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let result = DashboardConfig::from_toml("[source]\nkind = \"ftp\"\n");
        assert!(matches!(result, Err(Error::Toml(_))));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = DashboardConfig::load_from_path(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[source]\ntimeout_secs = 3").unwrap();

        let config = DashboardConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.source.timeout_secs, 3);
    }
}

//! Analysis configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/spendcast/config/analysis.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analysis.toml");

/// Settings for the trend forecaster
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    /// Share of month buckets held out for validation
    pub test_fraction: f64,
    pub seed: u64,
    /// Fewest month buckets required to forecast
    pub min_months: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            min_months: 2,
        }
    }
}

/// Settings for the amount -> category classifier
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub test_fraction: f64,
    pub seed: u64,
    /// None grows the tree until every leaf is pure
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

/// Full analysis configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub forecast: ForecastConfig,
    pub classifier: ClassifierConfig,
    /// Rows included in the cleaned dataset preview
    pub preview_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            forecast: ForecastConfig::default(),
            classifier: ClassifierConfig::default(),
            preview_rows: 5,
        }
    }
}

impl AnalysisConfig {
    /// Load from the per-user override if present, else the embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit override path.
    ///
    /// Unlike [`AnalysisConfig::load`], a missing file is an error.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        load_config(Some(path))
    }

    /// Parse config from TOML content, applied over the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        for (name, fraction) in [
            ("forecast.test_fraction", self.forecast.test_fraction),
            ("classifier.test_fraction", self.classifier.test_fraction),
        ] {
            if !(0.0..1.0).contains(&fraction) {
                return Err(Error::Config(format!(
                    "{} must be in [0, 1), got {}",
                    name, fraction
                )));
            }
        }
        if self.forecast.min_months < 2 {
            return Err(Error::Config(format!(
                "forecast.min_months must be at least 2, got {}",
                self.forecast.min_months
            )));
        }
        if self.classifier.min_samples_split < 2 {
            return Err(Error::Config(format!(
                "classifier.min_samples_split must be at least 2, got {}",
                self.classifier.min_samples_split
            )));
        }
        if self.classifier.max_depth == Some(0) {
            return Err(Error::Config(
                "classifier.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendcast").join("config").join("analysis.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<AnalysisConfig> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
        .filter(|p| p.exists());

    let content = match path {
        Some(path) => {
            debug!("Loading analysis config from {}", path.display());
            fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    forecast: Option<RawForecast>,
    classifier: Option<RawClassifier>,
    report: Option<RawReport>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawForecast {
    test_fraction: Option<f64>,
    seed: Option<u64>,
    min_months: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClassifier {
    test_fraction: Option<f64>,
    seed: Option<u64>,
    max_depth: Option<usize>,
    min_samples_split: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReport {
    preview_rows: Option<usize>,
}

fn parse_config(content: &str) -> Result<AnalysisConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AnalysisConfig::default();

    if let Some(forecast) = raw.forecast {
        if let Some(fraction) = forecast.test_fraction {
            config.forecast.test_fraction = fraction;
        }
        if let Some(seed) = forecast.seed {
            config.forecast.seed = seed;
        }
        if let Some(min_months) = forecast.min_months {
            config.forecast.min_months = min_months;
        }
    }

    if let Some(classifier) = raw.classifier {
        if let Some(fraction) = classifier.test_fraction {
            config.classifier.test_fraction = fraction;
        }
        if let Some(seed) = classifier.seed {
            config.classifier.seed = seed;
        }
        if classifier.max_depth.is_some() {
            config.classifier.max_depth = classifier.max_depth;
        }
        if let Some(min_split) = classifier.min_samples_split {
            config.classifier.min_samples_split = min_split;
        }
    }

    if let Some(report) = raw.report {
        if let Some(rows) = report.preview_rows {
            config.preview_rows = rows;
        }
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = AnalysisConfig::from_toml(
            r#"
[classifier]
max_depth = 3
seed = 7
"#,
        )
        .unwrap();

        assert_eq!(config.classifier.max_depth, Some(3));
        assert_eq!(config.classifier.seed, 7);
        assert_eq!(config.classifier.test_fraction, 0.2);
        assert_eq!(config.forecast, ForecastConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            AnalysisConfig::from_toml("[forecast]\ntest_fraction = 1.0\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml("[forecast]\nmin_months = 1\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml("[classifier]\nmax_depth = 0\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(matches!(
            AnalysisConfig::from_toml("[forecast]\nseeed = 1\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.toml");
        fs::write(&path, "[report]\npreview_rows = 12\n").unwrap();

        let config = AnalysisConfig::from_path(&path).unwrap();
        assert_eq!(config.preview_rows, 12);

        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            AnalysisConfig::from_path(&missing),
            Err(Error::Config(_))
        ));
    }
}

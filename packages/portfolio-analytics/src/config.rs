//! Engine configuration.
//!
//! All parameters are optional; a missing config file yields the defaults.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Tunable parameters for the metric computations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Confidence level for VaR (0.95 = 95%)
    pub confidence_level: f64,
    /// Annual risk-free rate (0.02 = 2%)
    pub risk_free_rate: f64,
    /// Rebalancing policy used by the turnover estimate
    pub rebalance_frequency: RebalanceFrequency,
    /// How the 1Y/3Y/5Y lookback offsets are applied
    pub lookback_basis: LookbackBasis,
    /// Window for rolling mean returns
    pub rolling_window: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            risk_free_rate: 0.02,
            rebalance_frequency: RebalanceFrequency::Monthly,
            lookback_basis: LookbackBasis::CalendarDays,
            rolling_window: 30,
        }
    }
}

impl AnalyticsConfig {
    /// Get the default config file path.
    ///
    /// Default path: `~/.portfolio-analytics/config.json`
    /// Can be overridden with `PORTFOLIO_ANALYTICS_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("PORTFOLIO_ANALYTICS_CONFIG") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".portfolio-analytics/config.json"))
            .unwrap_or_else(|| PathBuf::from("portfolio-analytics.json"))
    }

    /// Load from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load from a specific path. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a specific path, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject parameter values the engine cannot use.
    pub fn validate(&self) -> Result<()> {
        self.validate_metric_params()?;
        if self.rolling_window == 0 {
            return Err(Error::InvalidParameter(
                "rolling_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Check only the parameters the metrics bundle reads.
    pub fn validate_metric_params(&self) -> Result<()> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(Error::InvalidParameter(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "risk_free_rate must be finite, got {}",
                self.risk_free_rate
            )));
        }
        Ok(())
    }
}

/// Portfolio rebalancing policy.
///
/// Written as `"M"`, `"Q"` or any other label in config and on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RebalanceFrequency {
    #[default]
    Monthly,
    Quarterly,
    Other(String),
}

impl RebalanceFrequency {
    /// Parse a frequency label. Only the exact labels `M` and `Q` are
    /// recognized; anything else is kept verbatim.
    pub fn parse(label: &str) -> Self {
        match label {
            "M" => Self::Monthly,
            "Q" => Self::Quarterly,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Monthly => "M",
            Self::Quarterly => "Q",
            Self::Other(label) => label,
        }
    }
}

impl Serialize for RebalanceFrequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for RebalanceFrequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::parse(&label))
    }
}

/// How nominal day counts for 1Y/3Y/5Y windows are turned into a start date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookbackBasis {
    /// 252/756/1260 applied as calendar-day offsets from the end date.
    /// Matches historical outputs but spans less than a real year.
    #[default]
    CalendarDays,
    /// 252/756/1260 counted back as panel rows (trading days).
    TradingRows,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.confidence_level, 0.95);
        assert_eq!(config.risk_free_rate, 0.02);
        assert_eq!(config.rebalance_frequency, RebalanceFrequency::Monthly);
        assert_eq!(config.lookback_basis, LookbackBasis::CalendarDays);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = AnalyticsConfig::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AnalyticsConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"risk_free_rate": 0.04, "rebalance_frequency": "Q"}"#).unwrap();

        let config = AnalyticsConfig::load_from_path(&path).unwrap();
        assert_eq!(config.risk_free_rate, 0.04);
        assert_eq!(config.rebalance_frequency, RebalanceFrequency::Quarterly);
        assert_eq!(config.confidence_level, 0.95);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/config.json");

        let config = AnalyticsConfig {
            rebalance_frequency: RebalanceFrequency::parse("A"),
            lookback_basis: LookbackBasis::TradingRows,
            ..Default::default()
        };
        config.save_to_path(&path).unwrap();

        let reloaded = AnalyticsConfig::load_from_path(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_invalid_confidence_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"confidence_level": 1.5}"#).unwrap();

        let result = AnalyticsConfig::load_from_path(&path);
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_rolling_window_only_checked_by_full_validation() {
        let config = AnalyticsConfig {
            rolling_window: 0,
            ..Default::default()
        };
        assert!(config.validate_metric_params().is_ok());
        assert!(matches!(config.validate(), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_rebalance_labels() {
        assert_eq!(RebalanceFrequency::parse("M"), RebalanceFrequency::Monthly);
        assert_eq!(RebalanceFrequency::parse("Q"), RebalanceFrequency::Quarterly);
        assert_eq!(
            RebalanceFrequency::parse("m"),
            RebalanceFrequency::Other("m".to_string())
        );
        assert_eq!(
            RebalanceFrequency::parse(" Q"),
            RebalanceFrequency::Other(" Q".to_string())
        );
        assert_eq!(
            RebalanceFrequency::parse("W"),
            RebalanceFrequency::Other("W".to_string())
        );
        assert_eq!(RebalanceFrequency::Other("W".to_string()).label(), "W");
    }
}

//! Dashboard configuration.
//!
//! Values come from an optional JSON file; every missing key falls back to
//! the defaults below. The dataset path given on the command line wins over
//! the one in the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::aggregate::HIGH_THRESHOLD;

/// Default dataset file, looked up in the working directory.
pub const DEFAULT_DATASET: &str = "skill_half_life_ai.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{name} must be within [0, 100], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    #[error("histogram_bins must be at least 1")]
    NoHistogramBins,

    #[error("marker sizes must satisfy 0 < min_marker_size <= max_marker_size")]
    MarkerSizes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub dataset_path: PathBuf,

    /// Exposure strictly above this counts as "high" in the KPI row.
    pub high_exposure_threshold: f64,

    /// Automation risk strictly above this counts as "high".
    pub high_risk_threshold: f64,

    /// Bin count of the automation-risk histogram.
    pub histogram_bins: usize,

    /// Scatter marker radius range in points; sizes are scaled linearly into it.
    pub min_marker_size: f32,
    pub max_marker_size: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET),
            high_exposure_threshold: HIGH_THRESHOLD,
            high_risk_threshold: HIGH_THRESHOLD,
            histogram_bins: 10,
            min_marker_size: 2.0,
            max_marker_size: 12.0,
        }
    }
}

impl DashboardConfig {
    /// Read and validate a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("high_exposure_threshold", self.high_exposure_threshold),
            ("high_risk_threshold", self.high_risk_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        if self.histogram_bins == 0 {
            return Err(ConfigError::NoHistogramBins);
        }
        if !(self.min_marker_size > 0.0 && self.min_marker_size <= self.max_marker_size) {
            return Err(ConfigError::MarkerSizes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.dataset_path, PathBuf::from("skill_half_life_ai.csv"));
        assert_eq!(cfg.high_exposure_threshold, 70.0);
        assert_eq!(cfg.high_risk_threshold, 70.0);
        assert_eq!(cfg.histogram_bins, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.json");
        std::fs::write(&path, r#"{ "histogram_bins": 20, "dataset_path": "data/skills.parquet" }"#)
            .unwrap();

        let cfg = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(cfg.histogram_bins, 20);
        assert_eq!(cfg.dataset_path, PathBuf::from("data/skills.parquet"));
        assert_eq!(cfg.high_risk_threshold, 70.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cfg = DashboardConfig {
            high_risk_threshold: 120.0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ThresholdOutOfRange { name: "high_risk_threshold", .. })
        ));

        let cfg = DashboardConfig {
            histogram_bins: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::NoHistogramBins)));

        let cfg = DashboardConfig {
            min_marker_size: 20.0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::MarkerSizes)));
    }

    #[test]
    fn unreadable_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DashboardConfig::from_file(&dir.path().join("missing.json")),
            Err(ConfigError::Io { .. })
        ));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ histogram_bins: ").unwrap();
        assert!(matches!(
            DashboardConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}

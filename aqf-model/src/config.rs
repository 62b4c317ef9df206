//! Tunables for training and forecasting.
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides:
//!
//! ```toml
//! min_data_points = 80
//! training_interval_secs = 1800
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum records (and minimum non-missing targets per pollutant) to train
    pub min_data_points: usize,
    /// Models older than this are retrained before the next forecast
    pub training_interval_secs: u64,
    /// Leading share of the filtered rows used for fitting; the rest validates
    pub train_fraction: f64,
    /// Most recent records considered by the trend fallback
    pub trend_window: usize,
    /// Longest forecast accepted
    pub max_horizon_hours: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            min_data_points: 50,
            training_interval_secs: 3600,
            train_fraction: 0.8,
            trend_window: 48,
            max_horizon_hours: 168,
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("loaded pipeline config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_data_points < 2 {
            return Err(ConfigError::Invalid(format!(
                "min_data_points must be at least 2, got {}",
                self.min_data_points
            )));
        }
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "train_fraction must be strictly between 0 and 1, got {}",
                self.train_fraction
            )));
        }
        if self.trend_window == 0 {
            return Err(ConfigError::Invalid("trend_window must be positive".to_string()));
        }
        if self.max_horizon_hours == 0 {
            return Err(ConfigError::Invalid(
                "max_horizon_hours must be positive".to_string(),
            ));
        }
        if interval_from_secs(self.training_interval_secs).is_none() {
            return Err(ConfigError::Invalid(format!(
                "training_interval_secs is out of range, got {}",
                self.training_interval_secs
            )));
        }
        Ok(())
    }

    /// Retraining interval; values too large for a duration saturate.
    pub fn training_interval(&self) -> chrono::Duration {
        interval_from_secs(self.training_interval_secs).unwrap_or(chrono::TimeDelta::MAX)
    }
}

fn interval_from_secs(secs: u64) -> Option<chrono::Duration> {
    i64::try_from(secs).ok().and_then(chrono::Duration::try_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.min_data_points, 50);
        assert_eq!(config.training_interval(), chrono::Duration::hours(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str("min_data_points = 80\n").unwrap();
        assert_eq!(config.min_data_points, 80);
        assert_eq!(config.trend_window, 48);
        assert_eq!(config.train_fraction, 0.8);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(
            PipelineConfig::from_toml_str("").unwrap(),
            PipelineConfig::default()
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            PipelineConfig::from_toml_str("train_fraction = 1.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str("min_data_points = 1"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str("min_data_points = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_huge_training_interval_rejected() {
        assert!(matches!(
            PipelineConfig::from_toml_str("training_interval_secs = 9223372036854776"),
            Err(ConfigError::Invalid(_))
        ));
        let config = PipelineConfig::from_toml_str("training_interval_secs = 9223372036854").unwrap();
        assert_eq!(config.training_interval().num_seconds(), 9_223_372_036_854);
    }

    #[test]
    fn test_unvalidated_huge_interval_saturates() {
        let config = PipelineConfig {
            training_interval_secs: u64::MAX,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.training_interval(), chrono::TimeDelta::MAX);
    }
}

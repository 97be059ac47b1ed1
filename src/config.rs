//! Configuration management for the feature pipeline

use crate::pipeline::FeatureConfig;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input/output dataset locations
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// CSV of raw transaction/signup events
    pub events_path: String,
    /// CSV of IP-to-country ranges
    pub ip_ranges_path: String,
    /// Destination for the encoded feature table
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

fn default_output_path() -> String {
    "data/feature_table.csv".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config
            .features
            .validate()
            .context("Invalid feature configuration")?;

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                events_path: "data/Fraud_Data.csv".to_string(),
                ip_ranges_path: "data/IpAddress_to_Country.csv".to_string(),
                output_path: default_output_path(),
            },
            features: FeatureConfig {
                label_columns: vec!["country".to_string()],
                one_hot_columns: vec![
                    "source".to_string(),
                    "browser".to_string(),
                    "sex".to_string(),
                ],
                min_max_columns: vec![
                    "purchase_value".to_string(),
                    "time_since_last_transaction".to_string(),
                ],
                z_score_columns: vec!["age".to_string()],
            },
            logging: LoggingConfig::default(),
        }
    }
}

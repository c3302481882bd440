//! Stratus Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only `region` and `namespace` are
//! required.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use stratus_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str(
//!     "[cloudwatch]\nregion = \"us-east-1\"\nnamespace = \"MyApp\"",
//! )
//! .unwrap();
//! ```
//!
//! # Example Minimal Config
//!
//! ```toml
//! [cloudwatch]
//! region = "us-east-1"
//! namespace = "MyApp"
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [cloudwatch]
//! region = "us-east-1"
//! namespace = "MyApp"
//! force_flush_interval = "60s"
//! max_datums_per_call = 1000
//! max_values_per_datum = 150
//! rollup_dimensions = [["host"], ["host", "core"]]
//!
//! [cloudwatch.drop_original_metrics]
//! cpu_usage_idle = ["*"]
//!
//! [[cloudwatch.metric_decoration]]
//! category = "cpu"
//! name = "usage_idle"
//! rename = "CPU_IDLE"
//! unit = "Percent"
//! ```

mod cloudwatch;
mod error;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use cloudwatch::{CloudWatchConfig, ResourceToTelemetryConfig};
pub use error::{ConfigError, Result};

// Decoration rules live in the model crate so the shaping tables can be
// built from them directly.
pub use stratus_model::MetricDecoration;

use serde::Deserialize;

/// Main configuration structure
///
/// Everything defaults except the required fields inside `[cloudwatch]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CloudWatch egress settings
    pub cloudwatch: CloudWatchConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, contains invalid TOML, or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Invalid configuration refuses startup; there is no partial start.
    pub fn validate(&self) -> Result<()> {
        self.cloudwatch.validate()
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod lib_test;

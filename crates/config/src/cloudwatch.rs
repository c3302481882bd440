//! CloudWatch egress configuration
//!
//! The `[cloudwatch]` section: destination identity, flush and batching
//! limits, the optional credential surface, and the metric shaping tables
//! (decoration, rollup, drop-original).

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use stratus_model::MetricDecoration;

use crate::error::ConfigError;

/// Default force flush interval
pub const DEFAULT_FORCE_FLUSH_INTERVAL: Duration = Duration::from_secs(60);

/// `PutMetricData` accepts up to this many datums per call by default
pub const DEFAULT_MAX_DATUMS_PER_CALL: usize = 1000;

/// Default cap on entries in a single datum's value list
pub const DEFAULT_MAX_VALUES_PER_DATUM: usize = 150;

/// CloudWatch egress settings
///
/// # Example
///
/// ```toml
/// [cloudwatch]
/// region = "us-east-1"
/// namespace = "MyApp"
/// force_flush_interval = "60s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CloudWatchConfig {
    /// AWS region (required)
    pub region: String,

    /// Metric namespace for every request (required)
    pub namespace: String,

    /// Upper bound on the age of a batch before dispatch
    /// Default: 60s
    #[serde(with = "humantime_serde")]
    pub force_flush_interval: Duration,

    /// Maximum datums per API call
    /// Default: 1000
    pub max_datums_per_call: usize,

    /// Maximum entries in one datum's value list; longer distributions are
    /// split across datums with identical identity
    /// Default: 150
    pub max_values_per_datum: usize,

    /// Endpoint override for testing or private endpoints
    pub endpoint_override: String,

    /// Static access key (optional; default credential chain otherwise)
    pub access_key: String,

    /// Static secret key
    pub secret_key: String,

    /// Role to assume
    pub role_arn: String,

    /// Named profile in the shared credential file
    pub profile: String,

    /// Path to a shared credential file
    pub shared_credential_file: String,

    /// Session token for temporary credentials
    pub token: String,

    /// Metric name/unit rewrite rules
    pub metric_decoration: Vec<MetricDecoration>,

    /// Rollup specifications: each entry is an ordered dimension-name list.
    /// Deduplicated (order-preserving) on load.
    pub rollup_dimensions: Vec<Vec<String>>,

    /// Metric name → dimension names whose presence suppresses the
    /// original datum; `*` means all dimensions
    pub drop_original_metrics: HashMap<String, Vec<String>>,

    /// Resource attribute conversion
    pub resource_to_telemetry_conversion: ResourceToTelemetryConfig,
}

/// Controls whether resource attributes become metric tags
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ResourceToTelemetryConfig {
    /// When true, all resource attributes are merged into each point's
    /// tag map (point tags win on conflict)
    /// Default: false
    pub enabled: bool,
}

impl Default for CloudWatchConfig {
    fn default() -> Self {
        Self {
            region: String::new(),
            namespace: String::new(),
            force_flush_interval: DEFAULT_FORCE_FLUSH_INTERVAL,
            max_datums_per_call: DEFAULT_MAX_DATUMS_PER_CALL,
            max_values_per_datum: DEFAULT_MAX_VALUES_PER_DATUM,
            endpoint_override: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            role_arn: String::new(),
            profile: String::new(),
            shared_credential_file: String::new(),
            token: String::new(),
            metric_decoration: Vec::new(),
            rollup_dimensions: Vec::new(),
            drop_original_metrics: HashMap::new(),
            resource_to_telemetry_conversion: ResourceToTelemetryConfig::default(),
        }
    }
}

impl CloudWatchConfig {
    /// Validate the section
    ///
    /// # Errors
    ///
    /// Returns the first violated rule; the engine refuses to start on any.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.region.is_empty() {
            return Err(ConfigError::missing_field("region"));
        }
        if self.namespace.is_empty() {
            return Err(ConfigError::missing_field("namespace"));
        }
        if self.force_flush_interval < Duration::from_millis(1) {
            return Err(ConfigError::invalid_value(
                "force_flush_interval",
                "must be at least 1 millisecond",
            ));
        }
        if self.max_datums_per_call == 0 {
            return Err(ConfigError::invalid_value(
                "max_datums_per_call",
                "must be greater than zero",
            ));
        }
        if self.max_values_per_datum == 0 {
            return Err(ConfigError::invalid_value(
                "max_values_per_datum",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

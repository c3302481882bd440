//! Exporter runtime configuration
//!
//! Built from the `[cloudwatch]` TOML section, plus the channel and pool
//! tuning knobs that stay at their defaults outside of tests.

use std::collections::HashMap;
use std::time::Duration;

use stratus_config::CloudWatchConfig;
use stratus_model::MetricDecoration;

use crate::error::ExporterError;

// =============================================================================
// Constants
// =============================================================================

/// Default force flush interval
pub const DEFAULT_FORCE_FLUSH_INTERVAL: Duration = Duration::from_secs(60);

/// `PutMetricData` accepts up to this many datums per call by default
pub const DEFAULT_MAX_DATUMS_PER_CALL: usize = 1000;

/// Default cap on entries in a single datum's value list
pub const DEFAULT_MAX_VALUES_PER_DATUM: usize = 150;

/// 1 MB request limit, leaving 1 KB of headroom for the datum that seals
/// the batch, before any compression
pub const PAYLOAD_CEILING_BYTES: usize = 999_000;

/// Capacity of the datum channel (one converted metric field each)
pub const DATUM_CHANNEL_CAPACITY: usize = 10_000;

/// Capacity of the sealed-batch channel (one request each)
pub const BATCH_CHANNEL_CAPACITY: usize = 50;

/// Default number of concurrent publisher workers
pub const DEFAULT_PUBLISHER_WORKERS: usize = 10;

/// Default capacity of the publisher work queue
pub const DEFAULT_PUBLISHER_QUEUE_CAPACITY: usize = 10_000;

/// Retries per batch after the first attempt
pub const DEFAULT_RETRY_COUNT: usize = 5;

// =============================================================================
// Configuration
// =============================================================================

/// Runtime configuration for [`CloudWatchExporter`](crate::CloudWatchExporter)
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Metric namespace for every request
    pub namespace: String,

    /// Upper bound on the age of a batch before dispatch
    pub force_flush_interval: Duration,

    /// Maximum datums per API call
    pub max_datums_per_call: usize,

    /// Maximum entries in one datum's value list
    pub max_values_per_datum: usize,

    /// Datum channel capacity
    pub datum_channel_capacity: usize,

    /// Sealed-batch channel capacity
    pub batch_channel_capacity: usize,

    /// Number of publisher workers
    pub publisher_workers: usize,

    /// Publisher work queue capacity
    pub publisher_queue_capacity: usize,

    /// Retries per batch after the first attempt
    pub retry_count: usize,

    /// Metric name/unit rewrite rules
    pub metric_decoration: Vec<MetricDecoration>,

    /// Rollup specifications (deduplicated at start)
    pub rollup_dimensions: Vec<Vec<String>>,

    /// Drop-original rules
    pub drop_original_metrics: HashMap<String, Vec<String>>,

    /// Merge resource attributes into point tags
    pub resource_to_telemetry: bool,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            force_flush_interval: DEFAULT_FORCE_FLUSH_INTERVAL,
            max_datums_per_call: DEFAULT_MAX_DATUMS_PER_CALL,
            max_values_per_datum: DEFAULT_MAX_VALUES_PER_DATUM,
            datum_channel_capacity: DATUM_CHANNEL_CAPACITY,
            batch_channel_capacity: BATCH_CHANNEL_CAPACITY,
            publisher_workers: DEFAULT_PUBLISHER_WORKERS,
            publisher_queue_capacity: DEFAULT_PUBLISHER_QUEUE_CAPACITY,
            retry_count: DEFAULT_RETRY_COUNT,
            metric_decoration: Vec::new(),
            rollup_dimensions: Vec::new(),
            drop_original_metrics: HashMap::new(),
            resource_to_telemetry: false,
        }
    }
}

impl ExporterConfig {
    /// Build the runtime configuration from the TOML section.
    ///
    /// Channel and pool sizes keep their defaults; the TOML surface does
    /// not expose them.
    pub fn from_settings(settings: &CloudWatchConfig) -> Self {
        Self {
            namespace: settings.namespace.clone(),
            force_flush_interval: settings.force_flush_interval,
            max_datums_per_call: settings.max_datums_per_call,
            max_values_per_datum: settings.max_values_per_datum,
            metric_decoration: settings.metric_decoration.clone(),
            rollup_dimensions: settings.rollup_dimensions.clone(),
            drop_original_metrics: settings.drop_original_metrics.clone(),
            resource_to_telemetry: settings.resource_to_telemetry_conversion.enabled,
            ..Default::default()
        }
    }

    /// Set the namespace
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the force flush interval
    #[must_use]
    pub fn with_force_flush_interval(mut self, interval: Duration) -> Self {
        self.force_flush_interval = interval;
        self
    }

    /// Set the per-call datum limit
    #[must_use]
    pub fn with_max_datums_per_call(mut self, max: usize) -> Self {
        self.max_datums_per_call = max;
        self
    }

    /// Set the per-datum value limit
    #[must_use]
    pub fn with_max_values_per_datum(mut self, max: usize) -> Self {
        self.max_values_per_datum = max;
        self
    }

    /// Set the publisher worker count
    #[must_use]
    pub fn with_publisher_workers(mut self, workers: usize) -> Self {
        self.publisher_workers = workers;
        self
    }

    /// Set the publisher queue capacity
    #[must_use]
    pub fn with_publisher_queue_capacity(mut self, capacity: usize) -> Self {
        self.publisher_queue_capacity = capacity;
        self
    }

    /// Set the sealed-batch channel capacity
    #[must_use]
    pub fn with_batch_channel_capacity(mut self, capacity: usize) -> Self {
        self.batch_channel_capacity = capacity;
        self
    }

    /// Set the retry ceiling
    #[must_use]
    pub fn with_retry_count(mut self, count: usize) -> Self {
        self.retry_count = count;
        self
    }

    /// Set the rollup specifications
    #[must_use]
    pub fn with_rollup_dimensions(mut self, rollups: Vec<Vec<String>>) -> Self {
        self.rollup_dimensions = rollups;
        self
    }

    /// Validate the configuration; the exporter refuses to start otherwise
    pub fn validate(&self) -> Result<(), ExporterError> {
        if self.namespace.is_empty() {
            return Err(ExporterError::EmptyNamespace);
        }
        if self.force_flush_interval < Duration::from_millis(1) {
            return Err(ExporterError::FlushIntervalTooSmall);
        }
        if self.max_datums_per_call == 0 {
            return Err(ExporterError::ZeroLimit("max_datums_per_call"));
        }
        if self.max_values_per_datum == 0 {
            return Err(ExporterError::ZeroLimit("max_values_per_datum"));
        }
        if self.publisher_workers == 0 {
            return Err(ExporterError::ZeroLimit("publisher_workers"));
        }
        if self.publisher_queue_capacity == 0 {
            return Err(ExporterError::ZeroLimit("publisher_queue_capacity"));
        }
        if self.datum_channel_capacity == 0 {
            return Err(ExporterError::ZeroLimit("datum_channel_capacity"));
        }
        if self.batch_channel_capacity == 0 {
            return Err(ExporterError::ZeroLimit("batch_channel_capacity"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExporterConfig::default();
        assert_eq!(config.force_flush_interval, Duration::from_secs(60));
        assert_eq!(config.max_datums_per_call, 1000);
        assert_eq!(config.max_values_per_datum, 150);
        assert_eq!(config.publisher_workers, 10);
        assert_eq!(config.publisher_queue_capacity, 10_000);
        assert_eq!(config.retry_count, 5);
    }

    #[test]
    fn test_validate_requires_namespace() {
        let err = ExporterConfig::default().validate().unwrap_err();
        assert!(matches!(err, ExporterError::EmptyNamespace));
    }

    #[test]
    fn test_validate_rejects_tiny_interval() {
        let config = ExporterConfig::default()
            .with_namespace("ns")
            .with_force_flush_interval(Duration::from_micros(10));
        assert!(matches!(
            config.validate(),
            Err(ExporterError::FlushIntervalTooSmall)
        ));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = ExporterConfig::default()
            .with_namespace("ns")
            .with_max_datums_per_call(0);
        assert!(matches!(config.validate(), Err(ExporterError::ZeroLimit(_))));

        let config = ExporterConfig::default()
            .with_namespace("ns")
            .with_publisher_workers(0);
        assert!(matches!(config.validate(), Err(ExporterError::ZeroLimit(_))));
    }

    #[test]
    fn test_validate_accepts_minimal() {
        let config = ExporterConfig::default().with_namespace("ns");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_settings_copies_limits() {
        let mut settings = CloudWatchConfig::default();
        settings.namespace = "CWAgent".to_string();
        settings.force_flush_interval = Duration::from_secs(30);
        settings.max_datums_per_call = 500;
        settings.rollup_dimensions = vec![vec!["host".to_string()]];

        let config = ExporterConfig::from_settings(&settings);
        assert_eq!(config.namespace, "CWAgent");
        assert_eq!(config.force_flush_interval, Duration::from_secs(30));
        assert_eq!(config.max_datums_per_call, 500);
        assert_eq!(config.rollup_dimensions.len(), 1);
        // Tuning knobs stay at their defaults.
        assert_eq!(config.publisher_workers, DEFAULT_PUBLISHER_WORKERS);
        assert_eq!(config.datum_channel_capacity, DATUM_CHANNEL_CAPACITY);
    }
}

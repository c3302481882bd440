//! Stratus Exporter - CloudWatch metric egress engine
//!
//! Accepts converted metric datums and forwards them to the CloudWatch
//! `PutMetricData` API in bulk, respecting the per-request limits, meeting
//! freshness deadlines under light load, accelerating under bursts, and
//! draining cleanly on shutdown.
//!
//! # Architecture
//!
//! ```text
//! consume() ──> [datum channel] ──> Accumulator ──> [batch channel]
//!                 (bounded,          (seal on full     (bounded,
//!                  blocking)          or stale)         blocking)
//!                                                          │
//!                        FlushController <─────────────────┘
//!                        (jittered wake, adaptive interval)
//!                                │ non-blocking enqueue, drop on full
//!                                ▼
//!                        [publisher queue] ──> worker pool ──> retry ──> API
//! ```
//!
//! # Key Design
//!
//! - **Two-stage buffering**: datum batching optimises payload fullness;
//!   request dispatch optimises fleet-wide de-synchronisation
//! - **Asymmetric backpressure**: the accumulator blocks on a full batch
//!   channel (data is preserved upstream), while the flush controller drops
//!   on a full publisher queue (pool saturation must not stall the pipeline)
//! - **Adaptive interval**: the flush interval halves while the batch
//!   channel is saturated, floored at one second, and restores after one
//!   clean cycle
//! - **Fire-and-forget egress**: publishing failures never propagate to the
//!   ingress path; they are retried, then counted and logged

mod accumulator;
mod batch;
mod client;
mod config;
mod error;
mod exporter;
mod flusher;
mod metrics;
mod publisher;
mod retry;

pub use client::{CloudWatchMetricsApi, MetricsApi};
pub use config::{
    BATCH_CHANNEL_CAPACITY, DATUM_CHANNEL_CAPACITY, DEFAULT_FORCE_FLUSH_INTERVAL,
    DEFAULT_MAX_DATUMS_PER_CALL, DEFAULT_MAX_VALUES_PER_DATUM, DEFAULT_PUBLISHER_QUEUE_CAPACITY,
    DEFAULT_PUBLISHER_WORKERS, DEFAULT_RETRY_COUNT, ExporterConfig, PAYLOAD_CEILING_BYTES,
};
pub use error::{ExporterError, PublishError, ServiceErrorKind};
pub use exporter::CloudWatchExporter;
pub use metrics::{ExporterMetrics, ExporterSnapshot};

// Re-export the model types callers need to feed the exporter
pub use stratus_model::{
    Datum, DatumConverter, Dimension, HistogramPoint, Metric, MetricBundle, MetricData,
    MetricValue, NumberPoint, StatisticSet, StorageResolution, SummaryPoint,
};

/// Result type for exporter operations
pub type Result<T> = std::result::Result<T, ExporterError>;

#[cfg(test)]
mod flusher_test;
#[cfg(test)]
mod publisher_test;

//! Stratus Model - Metric data model for CloudWatch egress
//!
//! This crate provides the types that flow through the export pipeline:
//! - `Datum` - a single measurement shaped for one `PutMetricData` entry
//! - `Dimension` / `build_dimensions` - canonical dimension construction
//! - `process_rollup` / `DropFilter` - dimension rollup and drop-original rules
//! - `DecorationTable` - metric name/unit rewrite lookup
//! - `DatumConverter` - upstream metric points → shaped datums
//!
//! # Design Principles
//!
//! - **Deterministic shaping**: the same tag map always produces a
//!   byte-identical dimension list
//! - **Pure functions**: everything here is side-effect free and owned by
//!   the caller; the async pipeline lives in `stratus-exporter`
//! - **Immutable datums**: a `Datum` is never mutated after construction,
//!   ownership is transferred by channel send downstream

mod convert;
mod datum;
mod decoration;
mod dimensions;
mod error;
mod rollup;

pub use convert::{
    DatumConverter, HistogramPoint, Metric, MetricBundle, MetricData, NumberPoint, SummaryPoint,
};
pub use datum::{Datum, Dimension, MetricValue, StatisticSet, StorageResolution};
pub use decoration::{DecorationTable, MetricDecoration};
pub use dimensions::{build_dimensions, take_storage_resolution};
pub use error::ModelError;
pub use rollup::{DropFilter, process_rollup, unique_rollup_list};

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// CloudWatch accepts at most this many dimensions per datum
pub const MAX_DIMENSIONS: usize = 30;

/// Tag that is always promoted to the first dimension when present
pub const HOST_TAG: &str = "host";

/// Well-known tag carrying the storage resolution request.
/// Consumed (and removed) before dimension construction.
pub const HIGH_RESOLUTION_TAG: &str = "aws:StorageResolution";

/// Wildcard entry in a drop-original dimension list meaning "all dimensions"
pub const DROP_ORIGINAL_WILDCARD: &str = "*";

#[cfg(test)]
mod decoration_test;
#[cfg(test)]
mod dimensions_test;

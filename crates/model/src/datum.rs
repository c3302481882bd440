//! Datum - a single metric observation shaped for CloudWatch
//!
//! A `Datum` corresponds to one entry in a `PutMetricData` request. It is
//! immutable once built; the converter produces them and the pipeline only
//! moves them around.
//!
//! Payload sizes are *estimates* of the serialized request contribution,
//! used to keep a request under the service's 1 MB limit. They only need to
//! be conservative and stable, not exact.

use chrono::{DateTime, Utc};

// =============================================================================
// Size estimation constants
// =============================================================================

/// Estimated fixed serialized overhead per datum
/// (timestamp, unit, resolution, field framing)
const PER_DATUM_OVERHEAD_BYTES: usize = 80;

/// Estimated framing overhead per dimension entry, on top of name + value
const PER_DIMENSION_OVERHEAD_BYTES: usize = 16;

/// Estimated serialized size of one numeric value in a value list
const PER_VALUE_BYTES: usize = 24;

/// A statistic set carries sample count, sum, minimum and maximum
const STATISTIC_SET_VALUES: usize = 4;

// =============================================================================
// Types
// =============================================================================

/// A single name/value dimension pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Storage resolution requested for a datum
///
/// High resolution (1 second) is opt-in per datum via the
/// `aws:StorageResolution` tag; everything else is standard (60 seconds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageResolution {
    /// 60 second storage (default)
    #[default]
    Standard,
    /// 1 second storage
    High,
}

impl StorageResolution {
    /// The resolution period in seconds, as sent on the wire
    #[inline]
    pub fn period_seconds(&self) -> i32 {
        match self {
            Self::Standard => 60,
            Self::High => 1,
        }
    }
}

/// Pre-aggregated sample statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticSet {
    pub sample_count: f64,
    pub sum: f64,
    pub minimum: f64,
    pub maximum: f64,
}

/// The value payload of a datum
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// A single scalar observation
    Scalar(f64),
    /// Pre-aggregated statistics (summary-style metrics)
    Statistics(StatisticSet),
    /// A value/count distribution (histogram-style metrics).
    /// `values` and `counts` are parallel and equal length.
    Distribution { values: Vec<f64>, counts: Vec<f64> },
}

impl MetricValue {
    /// Number of list entries this value contributes to the request
    fn value_count(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Statistics(_) => STATISTIC_SET_VALUES,
            Self::Distribution { values, counts } => values.len() + counts.len(),
        }
    }
}

/// A single measurement record bound for one `PutMetricData` entry
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    /// Decorated metric name
    pub metric_name: String,

    /// Canonical (or rolled-up) dimension list, `host` first when present
    pub dimensions: Vec<Dimension>,

    /// Observation time
    pub timestamp: DateTime<Utc>,

    /// Value payload
    pub value: MetricValue,

    /// CloudWatch standard unit; `None` lets the service default apply
    pub unit: Option<String>,

    /// Requested storage resolution
    pub resolution: StorageResolution,
}

impl Datum {
    /// Estimated serialized size of this datum within a request, in bytes
    pub fn payload_size(&self) -> usize {
        let dims: usize = self
            .dimensions
            .iter()
            .map(|d| d.name.len() + d.value.len() + PER_DIMENSION_OVERHEAD_BYTES)
            .sum();
        PER_DATUM_OVERHEAD_BYTES
            + self.metric_name.len()
            + dims
            + self.value.value_count() * PER_VALUE_BYTES
    }

    /// Split a datum whose distribution exceeds `max_values_per_datum` into
    /// several datums with identical metric identity.
    ///
    /// Scalar and statistic-set datums are returned unchanged. A
    /// distribution with at most `max_values_per_datum` entries is also
    /// returned unchanged.
    pub fn split(self, max_values_per_datum: usize) -> Vec<Datum> {
        let (values, counts) = match &self.value {
            MetricValue::Distribution { values, counts }
                if values.len() > max_values_per_datum && max_values_per_datum > 0 =>
            {
                (values.clone(), counts.clone())
            }
            _ => return vec![self],
        };

        values
            .chunks(max_values_per_datum)
            .zip(counts.chunks(max_values_per_datum))
            .map(|(vs, cs)| Datum {
                value: MetricValue::Distribution {
                    values: vs.to_vec(),
                    counts: cs.to_vec(),
                },
                ..self.clone()
            })
            .collect()
    }
}

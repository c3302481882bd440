//! Upstream metric conversion
//!
//! The collector hands the exporter a [`MetricBundle`]: resource attributes
//! plus a list of metrics, each a series of points in one of four shapes
//! (gauge, sum, histogram, summary). [`DatumConverter`] turns every point
//! into zero or more shaped [`Datum`]s, applying in order:
//!
//! 1. resource attribute merge (when enabled; point tags win)
//! 2. storage-resolution tag extraction
//! 3. name/unit decoration
//! 4. canonical dimension construction
//! 5. rollup variant expansion
//! 6. drop-original filtering of the base variant
//! 7. distribution splitting at the per-datum value limit

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::datum::{Datum, MetricValue, StatisticSet};
use crate::decoration::DecorationTable;
use crate::dimensions::{build_dimensions, take_storage_resolution};
use crate::rollup::{DropFilter, process_rollup};

// =============================================================================
// Upstream model
// =============================================================================

/// A batch of collected metrics with their resource attributes
#[derive(Debug, Clone, Default)]
pub struct MetricBundle {
    /// Attributes of the producing resource (instance id, service name, ...)
    pub resource: BTreeMap<String, String>,

    /// Collected metrics
    pub metrics: Vec<Metric>,
}

/// One collected metric: identity plus a series of points
#[derive(Debug, Clone)]
pub struct Metric {
    /// Metric category (e.g. "cpu")
    pub category: String,

    /// Field name within the category (e.g. "usage_idle")
    pub name: String,

    /// Unit reported by the collector, used when no decoration applies
    pub unit: Option<String>,

    /// The point data
    pub data: MetricData,
}

/// Point data variants of the upstream model
#[derive(Debug, Clone)]
pub enum MetricData {
    /// Instantaneous sampled values
    Gauge(Vec<NumberPoint>),
    /// Cumulative or delta sums
    Sum(Vec<NumberPoint>),
    /// Bucketed value/count distributions
    Histogram(Vec<HistogramPoint>),
    /// Pre-aggregated sample statistics
    Summary(Vec<SummaryPoint>),
}

/// A scalar observation
#[derive(Debug, Clone)]
pub struct NumberPoint {
    pub tags: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// A value/count distribution observation.
/// `values` and `counts` are parallel and equal length.
#[derive(Debug, Clone)]
pub struct HistogramPoint {
    pub tags: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
    pub values: Vec<f64>,
    pub counts: Vec<f64>,
}

/// A pre-aggregated statistics observation
#[derive(Debug, Clone)]
pub struct SummaryPoint {
    pub tags: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
    pub sample_count: f64,
    pub sum: f64,
    pub minimum: f64,
    pub maximum: f64,
}

// =============================================================================
// Converter
// =============================================================================

/// Converts upstream metric points into shaped datums
///
/// Holds the shaping tables loaded at startup; conversion itself is pure
/// and deterministic.
#[derive(Debug, Clone, Default)]
pub struct DatumConverter {
    decorations: DecorationTable,
    rollups: Vec<Vec<String>>,
    drop_filter: DropFilter,
    max_values_per_datum: usize,
    resource_to_telemetry: bool,
}

impl DatumConverter {
    /// Create a converter from loaded shaping tables.
    ///
    /// `rollups` is expected to be pre-deduplicated (see
    /// [`unique_rollup_list`](crate::unique_rollup_list)).
    pub fn new(
        decorations: DecorationTable,
        rollups: Vec<Vec<String>>,
        drop_filter: DropFilter,
        max_values_per_datum: usize,
        resource_to_telemetry: bool,
    ) -> Self {
        Self {
            decorations,
            rollups,
            drop_filter,
            max_values_per_datum,
            resource_to_telemetry,
        }
    }

    /// Convert a bundle into the full set of datums to enqueue.
    ///
    /// Point order is preserved per metric; rollup variants of a point are
    /// emitted together, base variant first unless dropped.
    pub fn convert(&self, bundle: &MetricBundle) -> Vec<Datum> {
        let mut datums = Vec::new();
        for metric in &bundle.metrics {
            match &metric.data {
                MetricData::Gauge(points) | MetricData::Sum(points) => {
                    for p in points {
                        self.emit(
                            metric,
                            &p.tags,
                            &bundle.resource,
                            p.timestamp,
                            MetricValue::Scalar(p.value),
                            &mut datums,
                        );
                    }
                }
                MetricData::Histogram(points) => {
                    for p in points {
                        self.emit(
                            metric,
                            &p.tags,
                            &bundle.resource,
                            p.timestamp,
                            MetricValue::Distribution {
                                values: p.values.clone(),
                                counts: p.counts.clone(),
                            },
                            &mut datums,
                        );
                    }
                }
                MetricData::Summary(points) => {
                    for p in points {
                        self.emit(
                            metric,
                            &p.tags,
                            &bundle.resource,
                            p.timestamp,
                            MetricValue::Statistics(StatisticSet {
                                sample_count: p.sample_count,
                                sum: p.sum,
                                minimum: p.minimum,
                                maximum: p.maximum,
                            }),
                            &mut datums,
                        );
                    }
                }
            }
        }
        datums
    }

    /// Shape one point into its datum variants
    fn emit(
        &self,
        metric: &Metric,
        tags: &BTreeMap<String, String>,
        resource: &BTreeMap<String, String>,
        timestamp: DateTime<Utc>,
        value: MetricValue,
        out: &mut Vec<Datum>,
    ) {
        let mut tags = if self.resource_to_telemetry {
            let mut merged = resource.clone();
            merged.extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
            merged
        } else {
            tags.clone()
        };

        let resolution = take_storage_resolution(&mut tags);
        let metric_name = self.decorations.decorate_name(&metric.category, &metric.name);
        let unit = self
            .decorations
            .decorate_unit(&metric.category, &metric.name)
            .map(str::to_string)
            .or_else(|| metric.unit.clone());

        let base = build_dimensions(&tags);
        for (index, dimensions) in process_rollup(&self.rollups, &base).into_iter().enumerate() {
            // Index 0 is the original dimension set; only it is subject to
            // the drop-original filter.
            if index == 0 && self.drop_filter.drops_original(&metric_name, &dimensions) {
                continue;
            }
            let datum = Datum {
                metric_name: metric_name.clone(),
                dimensions,
                timestamp,
                value: value.clone(),
                unit: unit.clone(),
                resolution,
            };
            out.extend(datum.split(self.max_values_per_datum));
        }
    }
}

//! Dimension rollup and drop-original rules
//!
//! A rollup specification is an ordered list of dimension-name lists. For
//! every source datum, each specification that fully resolves against the
//! datum's dimensions yields an extra variant whose dimension order follows
//! the specification. The drop-original filter can then suppress the base
//! variant for configured metrics, so rolled-up series are not
//! double-counted.

use std::collections::{HashMap, HashSet};

use crate::DROP_ORIGINAL_WILDCARD;
use crate::datum::Dimension;

/// Deduplicate a rollup specification list, preserving first-seen order.
///
/// Entries are compared element-wise; applied once when configuration is
/// loaded so projection never has to re-check.
pub fn unique_rollup_list(lists: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut unique: Vec<Vec<String>> = Vec::with_capacity(lists.len());
    for list in lists {
        if !unique.contains(&list) {
            unique.push(list);
        }
    }
    unique
}

/// Expand a base dimension list into all emitted variants.
///
/// The base list is always first. Each specification entry contributes a
/// variant iff every named dimension resolves in the base list and the
/// projection differs from the base; order within a variant follows the
/// specification, not the canonical ordering.
pub fn process_rollup(specs: &[Vec<String>], base: &[Dimension]) -> Vec<Vec<Dimension>> {
    let by_name: HashMap<&str, &str> = base
        .iter()
        .map(|d| (d.name.as_str(), d.value.as_str()))
        .collect();

    let mut variants = Vec::with_capacity(1 + specs.len());
    variants.push(base.to_vec());

    for spec in specs {
        let mut projected = Vec::with_capacity(spec.len());
        let complete = spec.iter().all(|name| match by_name.get(name.as_str()) {
            Some(value) => {
                projected.push(Dimension::new(name, *value));
                true
            }
            None => false,
        });
        if complete && projected.as_slice() != base {
            variants.push(projected);
        }
    }
    variants
}

/// Drop-original filter: metric name → set of dimension names
///
/// A base datum is suppressed when its dimension list contains any matching
/// dimension; the `*` wildcard matches every dimension name.
#[derive(Debug, Clone, Default)]
pub struct DropFilter {
    metrics: HashMap<String, HashSet<String>>,
}

impl DropFilter {
    /// Build the filter from the raw configuration map
    pub fn new(config: &HashMap<String, Vec<String>>) -> Self {
        let metrics = config
            .iter()
            .map(|(metric, dims)| (metric.clone(), dims.iter().cloned().collect()))
            .collect();
        Self { metrics }
    }

    /// Whether the filter matches this metric/dimension pair
    pub fn is_dropped(&self, metric_name: &str, dimension_name: &str) -> bool {
        match self.metrics.get(metric_name) {
            Some(dims) => {
                dims.contains(DROP_ORIGINAL_WILDCARD) || dims.contains(dimension_name)
            }
            None => false,
        }
    }

    /// Whether the base variant of a datum should be suppressed
    pub fn drops_original(&self, metric_name: &str, dimensions: &[Dimension]) -> bool {
        dimensions
            .iter()
            .any(|d| self.is_dropped(metric_name, &d.name))
    }

    /// True when no metric has a drop rule
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

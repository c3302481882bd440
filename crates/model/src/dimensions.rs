//! Dimension construction
//!
//! Builds the canonical dimension list for a datum from its tag map.
//! CloudWatch supports up to 30 dimensions per metric, so we keep the
//! `host` tag (if any) plus the first 29 remaining tags in ascending
//! code-point order. Determinism matters here: the same tag map must always
//! produce the same list, since name + dimensions is the metric identity.

use std::collections::BTreeMap;

use crate::datum::{Dimension, StorageResolution};
use crate::{HIGH_RESOLUTION_TAG, HOST_TAG, MAX_DIMENSIONS};

/// Convert a tag map into the canonical dimension list.
///
/// Rules:
/// - a non-empty `host` tag is always first
/// - remaining tags follow in ascending code-point order of name
/// - empty-valued tags are skipped
/// - at most [`MAX_DIMENSIONS`] entries; the excess is dropped with a notice
pub fn build_dimensions(tags: &BTreeMap<String, String>) -> Vec<Dimension> {
    if tags.len() > MAX_DIMENSIONS {
        tracing::debug!(
            max = MAX_DIMENSIONS,
            count = tags.len(),
            "dropping dimensions beyond the per-metric limit"
        );
    }

    let mut dimensions = Vec::with_capacity(tags.len().min(MAX_DIMENSIONS));
    if let Some(host) = tags.get(HOST_TAG)
        && !host.is_empty()
    {
        dimensions.push(Dimension::new(HOST_TAG, host));
    }

    // BTreeMap iteration is already in ascending code-point order.
    for (name, value) in tags {
        if dimensions.len() >= MAX_DIMENSIONS {
            break;
        }
        if name == HOST_TAG || value.is_empty() {
            continue;
        }
        dimensions.push(Dimension::new(name, value));
    }
    dimensions
}

/// Consume the `aws:StorageResolution` tag from a tag map.
///
/// The tag is removed so it never becomes a dimension; a value of `true`
/// (case-insensitive) requests 1 second storage.
pub fn take_storage_resolution(tags: &mut BTreeMap<String, String>) -> StorageResolution {
    match tags.remove(HIGH_RESOLUTION_TAG) {
        Some(value) if value.eq_ignore_ascii_case("true") => StorageResolution::High,
        Some(_) | None => StorageResolution::Standard,
    }
}

//! Metric name and unit decoration
//!
//! Collected metrics arrive as `(category, field)` pairs, e.g.
//! `("cpu", "usage_idle")`. The decoration table lets operators rename
//! individual metrics and attach CloudWatch units; everything else falls
//! back to the conventional `category_field` join.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ModelError;

/// Units accepted by the `PutMetricData` API
const STANDARD_UNITS: &[&str] = &[
    "Seconds",
    "Microseconds",
    "Milliseconds",
    "Bytes",
    "Kilobytes",
    "Megabytes",
    "Gigabytes",
    "Terabytes",
    "Bits",
    "Kilobits",
    "Megabits",
    "Gigabits",
    "Terabits",
    "Percent",
    "Count",
    "Bytes/Second",
    "Kilobytes/Second",
    "Megabytes/Second",
    "Gigabytes/Second",
    "Terabytes/Second",
    "Bits/Second",
    "Kilobits/Second",
    "Megabits/Second",
    "Gigabits/Second",
    "Terabits/Second",
    "Count/Second",
    "None",
];

/// One decoration rule from configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MetricDecoration {
    /// Metric category (e.g. "cpu", "mem")
    pub category: String,

    /// Field name within the category (e.g. "usage_idle")
    pub name: String,

    /// Replacement metric name
    pub rename: Option<String>,

    /// CloudWatch unit to attach
    pub unit: Option<String>,
}

/// Lookup table built once at startup from the decoration rules
#[derive(Debug, Clone, Default)]
pub struct DecorationTable {
    renames: HashMap<(String, String), String>,
    units: HashMap<(String, String), String>,
}

impl DecorationTable {
    /// Build the table, validating units against the CloudWatch unit set.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnsupportedUnit`] for a unit the API would
    /// reject, so a bad table refuses startup instead of failing requests.
    pub fn new(decorations: &[MetricDecoration]) -> Result<Self, ModelError> {
        let mut table = Self::default();
        for d in decorations {
            if let Some(unit) = &d.unit {
                if !STANDARD_UNITS.contains(&unit.as_str()) {
                    return Err(ModelError::UnsupportedUnit {
                        unit: unit.clone(),
                        category: d.category.clone(),
                        name: d.name.clone(),
                    });
                }
                table
                    .units
                    .insert((d.category.clone(), d.name.clone()), unit.clone());
            }
            if let Some(rename) = &d.rename {
                table
                    .renames
                    .insert((d.category.clone(), d.name.clone()), rename.clone());
            }
        }
        Ok(table)
    }

    /// Decorated metric name for a `(category, field)` pair.
    ///
    /// A table hit wins. On miss, the field `"value"` collapses to the bare
    /// category, otherwise category and field are joined with the platform
    /// separator.
    pub fn decorate_name(&self, category: &str, name: &str) -> String {
        if let Some(rename) = self
            .renames
            .get(&(category.to_string(), name.to_string()))
        {
            return rename.clone();
        }
        if name == "value" {
            return category.to_string();
        }
        let separator = if cfg!(windows) { " " } else { "_" };
        format!("{category}{separator}{name}")
    }

    /// Unit for a `(category, field)` pair; `None` on miss so the caller
    /// can supply its own default
    pub fn decorate_unit(&self, category: &str, name: &str) -> Option<&str> {
        self.units
            .get(&(category.to_string(), name.to_string()))
            .map(String::as_str)
    }
}

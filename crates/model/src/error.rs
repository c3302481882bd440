//! Model error types

use thiserror::Error;

/// Errors that can occur while building the metric shaping tables
#[derive(Debug, Error)]
pub enum ModelError {
    /// A decoration rule names a unit the API would reject
    #[error("metric decoration for '{category}.{name}' has unsupported unit '{unit}'")]
    UnsupportedUnit {
        /// Metric category of the offending rule
        category: String,
        /// Field name of the offending rule
        name: String,
        /// The rejected unit string
        unit: String,
    },
}

//! Exporter error types

use thiserror::Error;

/// Errors that prevent the exporter from starting
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Namespace is required on every request
    #[error("'namespace' must not be empty")]
    EmptyNamespace,

    /// Sub-millisecond flush intervals degenerate into a busy loop
    #[error("'force_flush_interval' must be at least 1 millisecond")]
    FlushIntervalTooSmall,

    /// A limit or capacity that must be positive is zero
    #[error("'{0}' must be greater than zero")]
    ZeroLimit(&'static str),

    /// A metric shaping table failed to load
    #[error(transparent)]
    Model(#[from] stratus_model::ModelError),
}

/// Classification of a failed submit
///
/// Every class is retried; the class only decides log severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// The service throttled the request (`LimitExceededFault`)
    Throttled,
    /// The service reported an internal fault (`InternalServiceFault`)
    InternalFault,
    /// Any other structured service error, or a failure that could not be
    /// classified (transport errors, serialization)
    Other,
}

/// A failed `PutMetricData` call
#[derive(Debug, Error)]
#[error("put_metric_data failed ({code}): {message}")]
pub struct PublishError {
    /// Severity classification
    pub kind: ServiceErrorKind,

    /// Service error code, or `Unclassified` when none was available
    pub code: String,

    /// Human-readable detail
    pub message: String,
}

impl PublishError {
    /// Error for a failure with no structured service code
    pub fn unclassified(message: impl Into<String>) -> Self {
        Self {
            kind: ServiceErrorKind::Other,
            code: "Unclassified".to_string(),
            message: message.into(),
        }
    }
}

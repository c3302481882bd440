//! Datum batch
//!
//! One batch accumulates datums until it is full (datum count or estimated
//! payload size) or stale (older than the force flush interval), then its
//! contents move down the pipeline as one request.

use std::time::{Duration, Instant};

use stratus_model::Datum;

use crate::config::PAYLOAD_CEILING_BYTES;

/// Estimated fixed request overhead outside the datum list
pub(crate) const PER_REQUEST_OVERHEAD_BYTES: usize = 120;

/// Estimated framing overhead around the namespace field
pub(crate) const NAMESPACE_OVERHEAD_BYTES: usize = 24;

/// An in-progress batch of datums for one `PutMetricData` call
///
/// The running size starts at the per-request constant (request framing
/// plus namespace) so `is_full` reflects the final request size. The datum
/// that pushes the size over the ceiling still belongs to the batch; the
/// batch is sealed right after.
#[derive(Debug)]
pub(crate) struct DatumBatch {
    max_datums: usize,
    base_size: usize,
    datums: Vec<Datum>,
    begin: Instant,
    size_bytes: usize,
}

impl DatumBatch {
    /// Create an empty batch.
    ///
    /// `base_size` is the per-request constant: framing overhead plus the
    /// namespace contribution.
    pub(crate) fn new(max_datums: usize, base_size: usize) -> Self {
        Self {
            max_datums,
            base_size,
            datums: Vec::with_capacity(max_datums),
            begin: Instant::now(),
            size_bytes: base_size,
        }
    }

    /// Append a datum, growing the running size estimate
    pub(crate) fn push(&mut self, datum: Datum) {
        self.size_bytes += datum.payload_size();
        self.datums.push(datum);
    }

    /// Full when either the datum count or the payload ceiling is reached
    pub(crate) fn is_full(&self) -> bool {
        self.datums.len() >= self.max_datums || self.size_bytes >= PAYLOAD_CEILING_BYTES
    }

    /// Stale when non-empty and at least `interval` old
    pub(crate) fn is_stale(&self, interval: Duration) -> bool {
        !self.datums.is_empty() && self.begin.elapsed() >= interval
    }

    /// Take the accumulated datums and reset for the next batch
    pub(crate) fn drain(&mut self) -> Vec<Datum> {
        let datums = std::mem::replace(&mut self.datums, Vec::with_capacity(self.max_datums));
        self.begin = Instant::now();
        self.size_bytes = self.base_size;
        datums
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.datums.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.datums.is_empty()
    }

    #[inline]
    pub(crate) fn size_bytes(&self) -> usize {
        self.size_bytes
    }
}

//! Exporter metrics
//!
//! Atomic counters for pipeline observability. All operations use relaxed
//! ordering; values are eventually consistent, not real-time.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the egress pipeline
///
/// # Thread Safety
///
/// All methods are safe to call from multiple tasks concurrently.
#[derive(Debug, Default)]
pub struct ExporterMetrics {
    /// Datums accepted from the ingress
    datums_received: AtomicU64,

    /// Batches sealed by the accumulator (full or stale)
    batches_sealed: AtomicU64,

    /// Batches accepted by the API
    batches_published: AtomicU64,

    /// Datums accepted by the API
    datums_published: AtomicU64,

    /// Individual submit retries
    publish_retries: AtomicU64,

    /// Batches dropped after exhausting retries
    batches_failed: AtomicU64,

    /// Datums inside batches dropped after exhausting retries
    datums_failed: AtomicU64,

    /// Batches dropped because the publisher queue was full
    queue_dropped_batches: AtomicU64,

    /// Datums inside batches dropped at the publisher queue
    queue_dropped_datums: AtomicU64,

    /// Flush controller wakes whose drain moved at least one batch
    drain_wakes_with_batches: AtomicU64,
}

impl ExporterMetrics {
    /// Create new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            datums_received: AtomicU64::new(0),
            batches_sealed: AtomicU64::new(0),
            batches_published: AtomicU64::new(0),
            datums_published: AtomicU64::new(0),
            publish_retries: AtomicU64::new(0),
            batches_failed: AtomicU64::new(0),
            datums_failed: AtomicU64::new(0),
            queue_dropped_batches: AtomicU64::new(0),
            queue_dropped_datums: AtomicU64::new(0),
            drain_wakes_with_batches: AtomicU64::new(0),
        }
    }

    /// Record a datum accepted from the ingress
    #[inline]
    pub fn record_datum_received(&self) {
        self.datums_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a sealed batch handed to the flush stage
    #[inline]
    pub fn record_batch_sealed(&self) {
        self.batches_sealed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch accepted by the API
    #[inline]
    pub fn record_batch_published(&self, datum_count: u64) {
        self.batches_published.fetch_add(1, Ordering::Relaxed);
        self.datums_published
            .fetch_add(datum_count, Ordering::Relaxed);
    }

    /// Record one submit retry
    #[inline]
    pub fn record_retry(&self) {
        self.publish_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch dropped after exhausting retries
    #[inline]
    pub fn record_publish_failure(&self, datum_count: u64) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        self.datums_failed.fetch_add(datum_count, Ordering::Relaxed);
    }

    /// Record a batch dropped at the full publisher queue
    #[inline]
    pub fn record_queue_drop(&self, datum_count: u64) {
        self.queue_dropped_batches.fetch_add(1, Ordering::Relaxed);
        self.queue_dropped_datums
            .fetch_add(datum_count, Ordering::Relaxed);
    }

    /// Record a flush wake whose drain found at least one batch
    #[inline]
    pub fn record_drain_wake(&self) {
        self.drain_wakes_with_batches.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot of all counters
    pub fn snapshot(&self) -> ExporterSnapshot {
        ExporterSnapshot {
            datums_received: self.datums_received.load(Ordering::Relaxed),
            batches_sealed: self.batches_sealed.load(Ordering::Relaxed),
            batches_published: self.batches_published.load(Ordering::Relaxed),
            datums_published: self.datums_published.load(Ordering::Relaxed),
            publish_retries: self.publish_retries.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            datums_failed: self.datums_failed.load(Ordering::Relaxed),
            queue_dropped_batches: self.queue_dropped_batches.load(Ordering::Relaxed),
            queue_dropped_datums: self.queue_dropped_datums.load(Ordering::Relaxed),
            drain_wakes_with_batches: self.drain_wakes_with_batches.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of exporter metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExporterSnapshot {
    /// Datums accepted from the ingress
    pub datums_received: u64,
    /// Batches sealed by the accumulator
    pub batches_sealed: u64,
    /// Batches accepted by the API
    pub batches_published: u64,
    /// Datums accepted by the API
    pub datums_published: u64,
    /// Individual submit retries
    pub publish_retries: u64,
    /// Batches dropped after exhausting retries
    pub batches_failed: u64,
    /// Datums dropped after exhausting retries
    pub datums_failed: u64,
    /// Batches dropped at the full publisher queue
    pub queue_dropped_batches: u64,
    /// Datums dropped at the full publisher queue
    pub queue_dropped_datums: u64,
    /// Flush wakes whose drain moved at least one batch
    pub drain_wakes_with_batches: u64,
}

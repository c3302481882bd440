//! Submit with retry
//!
//! Every failed submit backs off and retries, up to the configured ceiling,
//! then the batch is dropped with an error log. Throttles and internal
//! service faults are expected weather and log at warn; anything else logs
//! at error but follows the same retry path.
//!
//! The backoff is half-jittered exponential: the n-th retry sleeps in
//! `[d/2, d)` where `d = 200ms * 2^n`, capped at one minute. The retry
//! counter is per worker and persists across batches until a submit
//! succeeds.

use std::sync::Arc;
use std::time::Duration;

use stratus_model::Datum;

use crate::client::MetricsApi;
use crate::error::ServiceErrorKind;
use crate::flusher::random_jitter;
use crate::metrics::ExporterMetrics;

/// Base duration doubled per retry
const BACKOFF_RETRY_BASE: Duration = Duration::from_millis(200);

/// Exponent cap: beyond this many accumulated retries the base duration
/// stops growing
const BACKOFF_MAX_EXPONENT: usize = 5;

/// Ceiling on the un-jittered backoff duration
const BACKOFF_CAP: Duration = Duration::from_secs(60);

/// Per-worker submit state: the shared client plus the retry counter
pub(crate) struct RetrySubmitter {
    client: Arc<dyn MetricsApi>,
    namespace: String,
    retry_count: usize,
    retries: usize,
    metrics: Arc<ExporterMetrics>,
}

impl RetrySubmitter {
    pub(crate) fn new(
        client: Arc<dyn MetricsApi>,
        namespace: String,
        retry_count: usize,
        metrics: Arc<ExporterMetrics>,
    ) -> Self {
        Self {
            client,
            namespace,
            retry_count,
            retries: 0,
            metrics,
        }
    }

    /// Submit one batch, retrying up to `retry_count` additional attempts.
    /// A batch that still fails is dropped; nothing propagates upstream.
    pub(crate) async fn submit(&mut self, datums: Vec<Datum>) {
        let mut last_error = None;

        for _ in 0..=self.retry_count {
            match self.client.put_metric_data(&self.namespace, &datums).await {
                Ok(()) => {
                    self.retries = 0;
                    self.metrics.record_batch_published(datums.len() as u64);
                    return;
                }
                Err(err) => {
                    match err.kind {
                        ServiceErrorKind::Throttled | ServiceErrorKind::InternalFault => {
                            tracing::warn!(
                                code = %err.code,
                                message = %err.message,
                                "put_metric_data rejected, will retry"
                            );
                        }
                        ServiceErrorKind::Other => {
                            tracing::error!(
                                code = %err.code,
                                message = %err.message,
                                "put_metric_data failed, will retry"
                            );
                        }
                    }
                    last_error = Some(err);
                    self.backoff_sleep().await;
                }
            }
        }

        if let Some(err) = last_error {
            tracing::error!(
                error = %err,
                datums = datums.len(),
                "dropping batch after exhausting retries"
            );
            self.metrics.record_publish_failure(datums.len() as u64);
        }
    }

    /// Sleep based on the number of retries done so far, then bump the
    /// counter
    async fn backoff_sleep(&mut self) {
        let duration = if self.retries <= BACKOFF_MAX_EXPONENT {
            BACKOFF_RETRY_BASE * (1u32 << self.retries)
        } else {
            BACKOFF_CAP
        };
        let half = duration / 2;
        let sleep_for = half + random_jitter(half);
        tracing::warn!(
            retries = self.retries,
            sleep_ms = sleep_for.as_millis() as u64,
            "backing off before retrying put_metric_data"
        );
        self.retries += 1;
        self.metrics.record_retry();
        tokio::time::sleep(sleep_for).await;
    }

    #[cfg(test)]
    pub(crate) fn current_retries(&self) -> usize {
        self.retries
    }
}

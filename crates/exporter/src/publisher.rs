//! Publisher pool
//!
//! A fixed pool of workers consuming batches from a bounded FIFO queue and
//! submitting them with retry. The enqueue side is non-blocking: a full
//! queue means the pool is saturated, and stalling the flush controller on
//! it would back the whole pipeline up behind a slow API, so the batch is
//! dropped and counted instead.

use std::sync::Arc;
use std::time::Duration;

use crossfire::{MAsyncRx, MAsyncTx, TrySendError};
use stratus_model::Datum;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::MetricsApi;
use crate::metrics::ExporterMetrics;
use crate::retry::RetrySubmitter;

/// How long `close` waits for in-flight submits before aborting workers
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// The worker pool; owns the worker tasks and their shutdown signal
#[derive(Debug)]
pub(crate) struct Publisher {
    handle: PublisherHandle,
    workers: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
}

/// Cloneable enqueue handle for the pool's work queue
#[derive(Debug, Clone)]
pub(crate) struct PublisherHandle {
    queue_tx: MAsyncTx<Vec<Datum>>,
    metrics: Arc<ExporterMetrics>,
}

impl Publisher {
    /// Spawn `worker_count` workers over a bounded queue of
    /// `queue_capacity` batches
    pub(crate) fn spawn(
        worker_count: usize,
        queue_capacity: usize,
        namespace: String,
        retry_count: usize,
        client: Arc<dyn MetricsApi>,
        metrics: Arc<ExporterMetrics>,
    ) -> Self {
        let (queue_tx, queue_rx) = crossfire::mpmc::bounded_async::<Vec<Datum>>(queue_capacity);
        let cancel = CancellationToken::new();

        let workers = (0..worker_count)
            .map(|worker_id| {
                let queue_rx: MAsyncRx<Vec<Datum>> = queue_rx.clone();
                let cancel = cancel.clone();
                let submitter = RetrySubmitter::new(
                    Arc::clone(&client),
                    namespace.clone(),
                    retry_count,
                    Arc::clone(&metrics),
                );
                tokio::spawn(worker_loop(worker_id, queue_rx, cancel, submitter))
            })
            .collect();

        tracing::debug!(
            workers = worker_count,
            queue_capacity,
            "publisher pool started"
        );

        Self {
            handle: PublisherHandle { queue_tx, metrics },
            workers,
            cancel,
        }
    }

    /// Get an enqueue handle for the flush controller
    pub(crate) fn handle(&self) -> PublisherHandle {
        self.handle.clone()
    }

    /// Stop the pool: workers finish the batch they currently hold, queued
    /// batches are abandoned. Workers that exceed the drain window (e.g.
    /// deep in a backoff sleep) are aborted.
    pub(crate) async fn close(self) {
        self.cancel.cancel();
        let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
        for mut worker in self.workers {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if tokio::time::timeout(remaining, &mut worker).await.is_err() {
                worker.abort();
                tracing::warn!("publisher worker exceeded drain window, aborted");
            }
        }
        tracing::debug!("publisher pool stopped");
    }
}

impl PublisherHandle {
    /// Non-blocking enqueue; a full queue drops the batch and bumps the
    /// drop counter
    pub(crate) fn publish(&self, batch: Vec<Datum>) {
        match self.queue_tx.try_send(batch) {
            Ok(()) => {}
            Err(TrySendError::Full(batch)) => {
                self.metrics.record_queue_drop(batch.len() as u64);
                tracing::debug!(datums = batch.len(), "publisher queue full, dropping batch");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("publisher queue closed, dropping batch");
            }
        }
    }
}

/// One pool worker: take a batch, submit with retry, repeat.
/// The shutdown signal is observed between batches, never mid-submit.
async fn worker_loop(
    worker_id: usize,
    queue_rx: MAsyncRx<Vec<Datum>>,
    cancel: CancellationToken,
    mut submitter: RetrySubmitter,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            received = queue_rx.recv() => match received {
                Ok(batch) => submitter.submit(batch).await,
                Err(_) => break,
            }
        }
    }
    tracing::trace!(worker_id, "publisher worker stopping");
}

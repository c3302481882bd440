//! Batch accumulator
//!
//! Single worker owning one in-progress batch at a time. Incoming datums
//! are appended until the batch is full; a one-second tick seals batches
//! that have gone stale. Sealed batches are handed to the flush stage with
//! a blocking send on purpose: when that stage is saturated, pressure
//! propagates back through the datum channel to the ingress instead of
//! data being dropped here.

use std::sync::Arc;
use std::time::Duration;

use stratus_model::Datum;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::batch::DatumBatch;
use crate::metrics::ExporterMetrics;

/// Staleness check resolution, independent of the configured flush
/// interval: a stale batch is dispatched within one second of expiry
/// regardless of further arrivals.
const STALENESS_TICK: Duration = Duration::from_secs(1);

pub(crate) struct Accumulator {
    datum_rx: mpsc::Receiver<Datum>,
    batch_tx: mpsc::Sender<Vec<Datum>>,
    batch: DatumBatch,
    force_flush_interval: Duration,
    cancel: CancellationToken,
    metrics: Arc<ExporterMetrics>,
}

impl Accumulator {
    pub(crate) fn new(
        datum_rx: mpsc::Receiver<Datum>,
        batch_tx: mpsc::Sender<Vec<Datum>>,
        batch: DatumBatch,
        force_flush_interval: Duration,
        cancel: CancellationToken,
        metrics: Arc<ExporterMetrics>,
    ) -> Self {
        Self {
            datum_rx,
            batch_tx,
            batch,
            force_flush_interval,
            cancel,
            metrics,
        }
    }

    /// Run until shutdown. Residual datums are left in the channels; the
    /// lifecycle coordinator decides how long to wait for them before the
    /// signal fires.
    pub(crate) async fn run(mut self) {
        let mut ticker = interval(STALENESS_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            // The tick outranks datum arrival so a steady trickle of input
            // cannot starve the staleness check; it is ready at most once
            // per second.
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::debug!("batch accumulator received shutdown signal, exiting");
                    return;
                }
                _ = ticker.tick() => {
                    if self.batch.is_stale(self.force_flush_interval) && !self.hand_off().await {
                        return;
                    }
                }
                datum = self.datum_rx.recv() => {
                    let Some(datum) = datum else {
                        tracing::debug!("datum channel closed, batch accumulator exiting");
                        return;
                    };
                    self.batch.push(datum);
                    if self.batch.is_full() && !self.hand_off().await {
                        return;
                    }
                }
            }
        }
    }

    /// Seal the current batch and send it downstream (blocking).
    ///
    /// Returns false when the batch channel is gone and the worker should
    /// exit.
    async fn hand_off(&mut self) -> bool {
        tracing::trace!(
            datums = self.batch.len(),
            size_bytes = self.batch.size_bytes(),
            "sealing batch"
        );
        let datums = self.batch.drain();
        self.metrics.record_batch_sealed();
        if self.batch_tx.send(datums).await.is_err() {
            tracing::debug!("batch channel closed, batch accumulator exiting");
            return false;
        }
        true
    }
}

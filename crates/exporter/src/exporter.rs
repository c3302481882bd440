//! Exporter lifecycle
//!
//! `CloudWatchExporter` wires the pipeline together: validate
//! configuration, build the shaping tables, launch the accumulator, flush
//! controller and publisher pool, and coordinate the bounded drain on
//! shutdown.

use std::sync::Arc;
use std::time::Duration;

use stratus_model::{
    Datum, DatumConverter, DecorationTable, DropFilter, MetricBundle, unique_rollup_list,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::accumulator::Accumulator;
use crate::batch::{DatumBatch, NAMESPACE_OVERHEAD_BYTES, PER_REQUEST_OVERHEAD_BYTES};
use crate::client::MetricsApi;
use crate::config::ExporterConfig;
use crate::error::ExporterError;
use crate::flusher::FlushController;
use crate::metrics::{ExporterMetrics, ExporterSnapshot};
use crate::publisher::Publisher;

/// How many one-second waits shutdown spends on a non-empty pipeline
const SHUTDOWN_DRAIN_POLLS: usize = 5;

/// Pause between shutdown drain polls
const SHUTDOWN_DRAIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// The metric egress engine
///
/// Constructed with [`start`](Self::start); feed it with
/// [`consume`](Self::consume) and stop it with [`shutdown`](Self::shutdown).
/// The remote client is shared and read-only after start.
#[derive(Debug)]
pub struct CloudWatchExporter {
    datum_tx: mpsc::Sender<Datum>,
    batch_probe: mpsc::Sender<Vec<Datum>>,
    converter: DatumConverter,
    publisher: Publisher,
    cancel: CancellationToken,
    metrics: Arc<ExporterMetrics>,
    workers: Vec<JoinHandle<()>>,
}

impl CloudWatchExporter {
    /// Validate the configuration, build the shaping tables and launch the
    /// pipeline workers.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid configuration or an unloadable
    /// decoration table; nothing is spawned in that case.
    pub fn start(
        config: ExporterConfig,
        client: Arc<dyn MetricsApi>,
    ) -> Result<Self, ExporterError> {
        config.validate()?;

        let decorations = DecorationTable::new(&config.metric_decoration)?;
        let rollups = unique_rollup_list(config.rollup_dimensions.clone());
        let drop_filter = DropFilter::new(&config.drop_original_metrics);
        let converter = DatumConverter::new(
            decorations,
            rollups,
            drop_filter,
            config.max_values_per_datum,
            config.resource_to_telemetry,
        );

        let metrics = Arc::new(ExporterMetrics::new());
        let cancel = CancellationToken::new();

        let (datum_tx, datum_rx) = mpsc::channel(config.datum_channel_capacity);
        let (batch_tx, batch_rx) = mpsc::channel(config.batch_channel_capacity);

        let publisher = Publisher::spawn(
            config.publisher_workers,
            config.publisher_queue_capacity,
            config.namespace.clone(),
            config.retry_count,
            client,
            Arc::clone(&metrics),
        );

        let base_size =
            PER_REQUEST_OVERHEAD_BYTES + config.namespace.len() + NAMESPACE_OVERHEAD_BYTES;
        let accumulator = Accumulator::new(
            datum_rx,
            batch_tx.clone(),
            DatumBatch::new(config.max_datums_per_call, base_size),
            config.force_flush_interval,
            cancel.clone(),
            Arc::clone(&metrics),
        );
        let flusher = FlushController::new(
            batch_rx,
            batch_tx.clone(),
            publisher.handle(),
            config.force_flush_interval,
            cancel.clone(),
            Arc::clone(&metrics),
        );

        let workers = vec![
            tokio::spawn(accumulator.run()),
            tokio::spawn(flusher.run()),
        ];

        tracing::info!(
            namespace = %config.namespace,
            flush_interval_ms = config.force_flush_interval.as_millis() as u64,
            max_datums_per_call = config.max_datums_per_call,
            publisher_workers = config.publisher_workers,
            "cloudwatch exporter started"
        );

        Ok(Self {
            datum_tx,
            batch_probe: batch_tx,
            converter,
            publisher,
            cancel,
            metrics,
            workers,
        })
    }

    /// Convert a bundle of collected metrics and enqueue the datums.
    ///
    /// Never returns an error: backpressure shows up as this call blocking
    /// while the datum channel is full, and publishing failures stay inside
    /// the pipeline.
    pub async fn consume(&self, bundle: &MetricBundle) {
        for datum in self.converter.convert(bundle) {
            self.metrics.record_datum_received();
            if self.datum_tx.send(datum).await.is_err() {
                tracing::debug!("datum channel closed, discarding remaining datums");
                return;
            }
        }
    }

    /// Get a point-in-time snapshot of the pipeline counters
    pub fn snapshot(&self) -> ExporterSnapshot {
        self.metrics.snapshot()
    }

    /// Get a shared handle to the pipeline counters
    pub fn metrics(&self) -> Arc<ExporterMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Stop the exporter with a cooperative drain.
    ///
    /// Waits up to five seconds for the intermediate channels to empty,
    /// then fires the shutdown signal, stops the workers and closes the
    /// publisher pool. Residual items are discarded after a diagnostic log
    /// of the remaining lengths.
    pub async fn shutdown(self) {
        tracing::info!("stopping cloudwatch exporter");

        for iteration in 0..SHUTDOWN_DRAIN_POLLS {
            if self.datum_backlog() == 0 && self.batch_backlog() == 0 {
                break;
            }
            tracing::debug!(
                iteration,
                "metric data still pending, waiting before shutdown"
            );
            tokio::time::sleep(SHUTDOWN_DRAIN_POLL_INTERVAL).await;
        }

        let (datum_backlog, batch_backlog) = (self.datum_backlog(), self.batch_backlog());
        if datum_backlog != 0 || batch_backlog != 0 {
            tracing::debug!(
                datum_backlog,
                batch_backlog,
                "discarding residual items at shutdown"
            );
        }

        self.cancel.cancel();
        for worker in self.workers {
            let _ = worker.await;
        }
        self.publisher.close().await;

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            datums_received = snapshot.datums_received,
            batches_published = snapshot.batches_published,
            datums_published = snapshot.datums_published,
            batches_failed = snapshot.batches_failed,
            queue_dropped_batches = snapshot.queue_dropped_batches,
            "cloudwatch exporter stopped"
        );
    }

    /// Items currently buffered in the datum channel
    fn datum_backlog(&self) -> usize {
        self.datum_tx.max_capacity() - self.datum_tx.capacity()
    }

    /// Items currently buffered in the batch channel
    fn batch_backlog(&self) -> usize {
        self.batch_probe.max_capacity() - self.batch_probe.capacity()
    }
}

//! Flush controller
//!
//! Decides *when* sealed batches move to the publisher pool. Wakes on a
//! jittered schedule derived from the force flush interval - jitter
//! staggers fleets of agents started together - and drains the batch
//! channel without blocking on each wake.
//!
//! Under backpressure (batch channel at capacity) the interval halves,
//! floored at one second, and the pending wake moves halfway closer. A
//! publish cycle that starts without a full channel restores the
//! configured interval, which keeps the adaptation from flapping.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;
use stratus_model::Datum;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::metrics::ExporterMetrics;
use crate::publisher::PublisherHandle;

/// Floor for the adaptive interval; halving stops here so the controller
/// never degenerates into a busy loop
const MIN_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Sleep granularity; shutdown is observed at least this often
const SLEEP_GRANULARITY_MS: i64 = 1000;

pub(crate) struct FlushController {
    batch_rx: mpsc::Receiver<Vec<Datum>>,
    /// Sender-side probe of the batch channel, used only to detect
    /// saturation; never sent on.
    batch_probe: mpsc::Sender<Vec<Datum>>,
    publisher: PublisherHandle,
    force_flush_interval: Duration,
    cancel: CancellationToken,
    metrics: Arc<ExporterMetrics>,
}

impl FlushController {
    pub(crate) fn new(
        batch_rx: mpsc::Receiver<Vec<Datum>>,
        batch_probe: mpsc::Sender<Vec<Datum>>,
        publisher: PublisherHandle,
        force_flush_interval: Duration,
        cancel: CancellationToken,
        metrics: Arc<ExporterMetrics>,
    ) -> Self {
        Self {
            batch_rx,
            batch_probe,
            publisher,
            force_flush_interval,
            cancel,
            metrics,
        }
    }

    /// Run until shutdown
    pub(crate) async fn run(mut self) {
        let mut current_interval = self.force_flush_interval;
        let mut next_ms = first_push_ms(current_interval);
        let mut buffer_full_occurred = false;

        loop {
            if self.cancel.is_cancelled() {
                tracing::debug!("flush controller received shutdown signal, exiting");
                return;
            }

            let now_ms = epoch_ms();

            // Accelerate at most once per interval while the batch channel
            // is saturated.
            if self.batch_channel_full() && !buffer_full_occurred {
                buffer_full_occurred = true;
                if current_interval > MIN_FLUSH_INTERVAL {
                    (current_interval, next_ms) = accelerate(current_interval, now_ms, next_ms);
                    tracing::debug!(
                        interval_ms = current_interval.as_millis() as u64,
                        "batch buffer full, accelerating flush interval"
                    );
                }
            }

            let mut should_publish = false;
            if now_ms >= next_ms {
                should_publish = true;
                // Restore the interval if the buffer did not fill up during
                // this cycle.
                if !buffer_full_occurred {
                    current_interval = self.force_flush_interval;
                }
                next_ms += current_interval.as_millis() as i64;
            }

            if should_publish {
                self.drain_batches();
                buffer_full_occurred = false;
            }

            // Sleep one second, unless the next wake is closer than that.
            let remaining_ms = next_ms - now_ms;
            let sleep_for = if remaining_ms > SLEEP_GRANULARITY_MS {
                Duration::from_millis(SLEEP_GRANULARITY_MS as u64)
            } else {
                Duration::from_millis(remaining_ms.max(0) as u64)
            };
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::debug!("flush controller received shutdown signal, exiting");
                    return;
                }
                _ = tokio::time::sleep(sleep_for) => {}
            }
        }
    }

    /// Whether the batch channel has no free capacity
    fn batch_channel_full(&self) -> bool {
        self.batch_probe.capacity() == 0
    }

    /// Move every currently queued batch to the publisher without blocking
    fn drain_batches(&mut self) {
        let mut moved = 0usize;
        while let Ok(batch) = self.batch_rx.try_recv() {
            self.publisher.publish(batch);
            moved += 1;
        }
        if moved > 0 {
            self.metrics.record_drain_wake();
            tracing::trace!(batches = moved, "drained batch channel");
        }
    }
}

/// Halve the interval (floored at one second) and pull the pending wake
/// halfway closer
pub(crate) fn accelerate(current: Duration, now_ms: i64, next_ms: i64) -> (Duration, i64) {
    let mut halved = current / 2;
    if halved < MIN_FLUSH_INTERVAL {
        halved = MIN_FLUSH_INTERVAL;
    }
    (halved, now_ms + (next_ms - now_ms) / 2)
}

/// The time of the first publish wake, in epoch milliseconds.
///
/// Rounds the current time down to an interval boundary and adds a random
/// jitter within the interval; a result in the past moves forward one full
/// interval.
pub(crate) fn first_push_ms(interval: Duration) -> i64 {
    let jitter = random_jitter(interval);
    tracing::info!(
        interval_ms = interval.as_millis() as u64,
        jitter_ms = jitter.as_millis() as u64,
        "flush schedule initialized"
    );
    let interval_ms = (interval.as_millis() as i64).max(1);
    let now_ms = epoch_ms();
    let mut next_ms = now_ms - now_ms % interval_ms + jitter.as_millis() as i64;
    if next_ms < now_ms {
        next_ms += interval_ms;
    }
    next_ms
}

/// A uniformly random duration in `[0, bound)`
pub(crate) fn random_jitter(bound: Duration) -> Duration {
    let bound_ms = bound.as_millis() as u64;
    if bound_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..bound_ms))
}

/// Current wall-clock time in epoch milliseconds
pub(crate) fn epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

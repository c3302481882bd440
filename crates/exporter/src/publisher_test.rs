//! Publisher pool tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use stratus_model::{Datum, Dimension, MetricValue, StorageResolution};
use tokio::time::timeout;

use crate::client::MetricsApi;
use crate::error::PublishError;
use crate::metrics::ExporterMetrics;
use crate::publisher::Publisher;

fn batch(count: usize) -> Vec<Datum> {
    (0..count)
        .map(|i| Datum {
            metric_name: format!("metric_{i}"),
            dimensions: vec![Dimension::new("host", "h1")],
            timestamp: Utc::now(),
            value: MetricValue::Scalar(i as f64),
            unit: None,
            resolution: StorageResolution::Standard,
        })
        .collect()
}

/// Counts submitted batches; optionally stalls each call
struct CountingApi {
    submitted: Mutex<Vec<usize>>,
    calls: AtomicUsize,
    delay: Duration,
}

impl CountingApi {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            submitted: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay,
        })
    }
}

#[async_trait]
impl MetricsApi for CountingApi {
    async fn put_metric_data(
        &self,
        _namespace: &str,
        datums: &[Datum],
    ) -> Result<(), PublishError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.submitted.lock().unwrap().push(datums.len());
        Ok(())
    }
}

fn pool(
    workers: usize,
    queue_capacity: usize,
    api: Arc<CountingApi>,
) -> (Publisher, Arc<ExporterMetrics>) {
    let metrics = Arc::new(ExporterMetrics::new());
    let publisher = Publisher::spawn(
        workers,
        queue_capacity,
        "TestNamespace".to_string(),
        5,
        api,
        metrics.clone(),
    );
    (publisher, metrics)
}

#[tokio::test]
async fn test_publish_reaches_the_api() {
    let api = CountingApi::new(Duration::ZERO);
    let (publisher, metrics) = pool(2, 10, api.clone());

    publisher.handle().publish(batch(3));
    publisher.handle().publish(batch(5));

    timeout(Duration::from_secs(1), async {
        while api.calls.load(Ordering::SeqCst) < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("batches never submitted");

    let mut sizes = api.submitted.lock().unwrap().clone();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![3, 5]);
    assert_eq!(metrics.snapshot().batches_published, 2);

    publisher.close().await;
}

#[tokio::test]
async fn test_full_queue_drops_and_counts() {
    // One worker stalled on a slow call, queue of one: the third publish in
    // a burst has nowhere to go.
    let api = CountingApi::new(Duration::from_millis(300));
    let (publisher, metrics) = pool(1, 1, api.clone());
    let handle = publisher.handle();

    handle.publish(batch(1));
    // Give the worker time to take the first batch off the queue.
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.publish(batch(2));
    handle.publish(batch(3));

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.queue_dropped_batches, 1);
    assert_eq!(snapshot.queue_dropped_datums, 3);

    publisher.close().await;
}

#[tokio::test]
async fn test_close_waits_for_in_flight_submit() {
    let api = CountingApi::new(Duration::from_millis(200));
    let (publisher, _metrics) = pool(1, 10, api.clone());

    publisher.handle().publish(batch(1));
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The worker is mid-submit; close must let it finish.
    publisher.close().await;
    assert_eq!(*api.submitted.lock().unwrap(), vec![1]);
}

#[tokio::test]
async fn test_close_abandons_queued_batches() {
    let api = CountingApi::new(Duration::from_millis(300));
    let (publisher, _metrics) = pool(1, 10, api.clone());
    let handle = publisher.handle();

    handle.publish(batch(1));
    tokio::time::sleep(Duration::from_millis(50)).await;
    // These sit in the queue behind the stalled worker.
    handle.publish(batch(2));
    handle.publish(batch(3));

    publisher.close().await;

    // Only the in-flight batch was submitted; queued ones were abandoned.
    assert_eq!(api.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_close_with_idle_workers_is_quick() {
    let api = CountingApi::new(Duration::ZERO);
    let (publisher, _metrics) = pool(4, 10, api);

    timeout(Duration::from_secs(1), publisher.close())
        .await
        .expect("close did not return promptly");
}

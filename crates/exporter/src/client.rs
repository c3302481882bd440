//! CloudWatch client seam
//!
//! The pipeline talks to the API through [`MetricsApi`], so tests can
//! substitute an in-process implementation. [`CloudWatchMetricsApi`] is the
//! production implementation over the AWS SDK; it owns the translation to
//! wire shapes and the classification of SDK errors into
//! [`ServiceErrorKind`](crate::ServiceErrorKind).

use async_trait::async_trait;
use aws_sdk_cloudwatch::Client;
use aws_sdk_cloudwatch::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_cloudwatch::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_cloudwatch::operation::put_metric_data::PutMetricDataError;
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{
    Dimension as SdkDimension, MetricDatum, StandardUnit, StatisticSet as SdkStatisticSet,
};

use stratus_config::CloudWatchConfig;
use stratus_model::{Datum, MetricValue};

use crate::error::{PublishError, ServiceErrorKind};

/// Service code for a throttled request
const THROTTLE_ERROR_CODE: &str = "LimitExceededFault";

/// Service code for a server-side fault
const INTERNAL_ERROR_CODE: &str = "InternalServiceFault";

/// The remote metrics API as the pipeline sees it
#[async_trait]
pub trait MetricsApi: Send + Sync {
    /// Submit one request: the given datums under a single namespace
    async fn put_metric_data(&self, namespace: &str, datums: &[Datum])
    -> Result<(), PublishError>;
}

/// `MetricsApi` implementation over the AWS SDK client
pub struct CloudWatchMetricsApi {
    client: Client,
}

impl CloudWatchMetricsApi {
    /// Build the SDK client from the configured credential surface.
    ///
    /// Static keys and a named profile are wired up when present;
    /// everything else falls back to the default provider chain.
    pub async fn new(settings: &CloudWatchConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));
        if !settings.profile.is_empty() {
            loader = loader.profile_name(&settings.profile);
        }
        if !settings.access_key.is_empty() && !settings.secret_key.is_empty() {
            let token = (!settings.token.is_empty()).then(|| settings.token.clone());
            loader = loader.credentials_provider(Credentials::from_keys(
                settings.access_key.clone(),
                settings.secret_key.clone(),
                token,
            ));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_cloudwatch::config::Builder::from(&shared);
        if !settings.endpoint_override.is_empty() {
            builder = builder.endpoint_url(&settings.endpoint_override);
        }
        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl MetricsApi for CloudWatchMetricsApi {
    async fn put_metric_data(
        &self,
        namespace: &str,
        datums: &[Datum],
    ) -> Result<(), PublishError> {
        let data = datums
            .iter()
            .map(to_metric_datum)
            .collect::<Result<Vec<_>, _>>()?;

        self.client
            .put_metric_data()
            .namespace(namespace)
            .set_metric_data(Some(data))
            .send()
            .await
            .map(|_| ())
            .map_err(classify)
    }
}

/// Translate a datum into the SDK request shape
fn to_metric_datum(datum: &Datum) -> Result<MetricDatum, PublishError> {
    let mut builder = MetricDatum::builder()
        .metric_name(&datum.metric_name)
        .timestamp(DateTime::from_millis(datum.timestamp.timestamp_millis()))
        .storage_resolution(datum.resolution.period_seconds());

    for dim in &datum.dimensions {
        let dimension = SdkDimension::builder().name(&dim.name).value(&dim.value).build();
        builder = builder.dimensions(dimension);
    }

    if let Some(unit) = &datum.unit {
        builder = builder.unit(StandardUnit::from(unit.as_str()));
    }

    builder = match &datum.value {
        MetricValue::Scalar(value) => builder.value(*value),
        MetricValue::Statistics(set) => {
            let values = SdkStatisticSet::builder()
                .sample_count(set.sample_count)
                .sum(set.sum)
                .minimum(set.minimum)
                .maximum(set.maximum)
                .build();
            builder.statistic_values(values)
        }
        MetricValue::Distribution { values, counts } => builder
            .set_values(Some(values.clone()))
            .set_counts(Some(counts.clone())),
    };

    Ok(builder.build())
}

/// Map an SDK error onto the retry classification.
///
/// Errors without a structured service code (transport failures, dispatch
/// errors) land in `Other`; they retry like everything else but log at
/// error severity.
fn classify(err: SdkError<PutMetricDataError>) -> PublishError {
    let code = err.code().unwrap_or_default().to_string();
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string());
    let kind = match code.as_str() {
        THROTTLE_ERROR_CODE => ServiceErrorKind::Throttled,
        INTERNAL_ERROR_CODE => ServiceErrorKind::InternalFault,
        _ => ServiceErrorKind::Other,
    };
    PublishError {
        kind,
        code: if code.is_empty() {
            "Unclassified".to_string()
        } else {
            code
        },
        message,
    }
}

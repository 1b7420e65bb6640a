use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

pub(crate) const METRIC_STORE_REQUESTS_TOTAL: &str = "faultboard_store_requests_total";
pub(crate) const METRIC_STORE_REQUEST_MS: &str = "faultboard_store_request_ms";
pub(crate) const METRIC_STALE_RESPONSES_TOTAL: &str = "faultboard_stale_responses_total";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_STORE_REQUESTS_TOTAL,
            Unit::Count,
            "Total number of requests sent to the hosted store, by operation and outcome."
        );
        describe_histogram!(
            METRIC_STORE_REQUEST_MS,
            Unit::Milliseconds,
            "Hosted store round-trip latency in milliseconds."
        );
        describe_counter!(
            METRIC_STALE_RESPONSES_TOTAL,
            Unit::Count,
            "Total number of region loads discarded because a newer load superseded them."
        );
    });
}

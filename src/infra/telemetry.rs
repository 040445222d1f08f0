use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::posts::write::METRIC_POST_SUBMIT;
use crate::cache::{METRIC_READ_CACHE_HIT, METRIC_READ_CACHE_INVALIDATE, METRIC_READ_CACHE_MISS};
use crate::config::{LogFormat, LoggingSettings};
use crate::infra::cache_warmer::METRIC_CACHE_WARM_MS;

use super::error::InfraError;

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

pub(crate) fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_READ_CACHE_HIT,
            Unit::Count,
            "Total number of reads served from the tagged read cache."
        );
        describe_counter!(
            METRIC_READ_CACHE_MISS,
            Unit::Count,
            "Total number of reads that had to reach the blog API."
        );
        describe_counter!(
            METRIC_READ_CACHE_INVALIDATE,
            Unit::Count,
            "Total number of cache tag invalidations."
        );
        describe_counter!(
            METRIC_POST_SUBMIT,
            Unit::Count,
            "Total number of post submissions, labelled by outcome."
        );
        describe_histogram!(
            METRIC_CACHE_WARM_MS,
            Unit::Milliseconds,
            "Startup cache warmup latency in milliseconds."
        );
    });
}

use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install the global subscriber. `RUST_LOG` directives override the
/// configured level.
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

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "chefer_cache_hit_total",
            Unit::Count,
            "Reference data reads served from the cache, by kind."
        );
        describe_counter!(
            "chefer_cache_miss_total",
            Unit::Count,
            "Reference data reads that went to the store, by kind."
        );
        describe_counter!(
            "chefer_cache_evict_total",
            Unit::Count,
            "Cache entries evicted due to capacity."
        );
        describe_counter!(
            "chefer_mail_sent_total",
            Unit::Count,
            "Outgoing mail accepted by the transport."
        );
        describe_counter!(
            "chefer_mail_failed_total",
            Unit::Count,
            "Outgoing mail rejected by or unreachable through the transport."
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describing_metrics_twice_is_harmless() {
        describe_metrics();
        describe_metrics();
    }
}

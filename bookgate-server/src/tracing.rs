//! Logging and OpenTelemetry setup for the bookgate services

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{self, RandomIdGenerator, Sampler},
    Resource,
};
use std::time::Duration;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const DEFAULT_FILTER: &str = "info,bookgate=debug,tower_http=debug";

/// Check whether `OTEL_ENABLED` asks for OpenTelemetry export
pub fn otel_enabled() -> bool {
    std::env::var("OTEL_ENABLED")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false)
}

/// Initialize logging: OpenTelemetry + console when `otel` is set,
/// console only otherwise.
pub fn init(service_name: &str, otel: bool) -> anyhow::Result<()> {
    if otel {
        init_tracing_stack(service_name)?;
        tracing::info!("OpenTelemetry tracing enabled");
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install subscriber: {}", e))?;
        tracing::info!("Console logging enabled (set OTEL_ENABLED=true for OpenTelemetry)");
    }
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize OpenTelemetry with OTLP exporter
pub fn init_telemetry(service_name: &str) -> anyhow::Result<opentelemetry_sdk::trace::Tracer> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    let resource = Resource::new(vec![
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_secs(3));

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            trace::config()
                .with_sampler(sampler_from(
                    std::env::var("OTEL_TRACES_SAMPLER_ARG").ok().as_deref(),
                ))
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(resource),
        )
        .install_batch(runtime::Tokio)?;

    Ok(tracer)
}

/// Sampler for a raw `OTEL_TRACES_SAMPLER_ARG` value. Unparseable or
/// missing values sample everything.
fn sampler_from(raw: Option<&str>) -> Sampler {
    let sample_rate = raw.and_then(|s| s.parse::<f64>().ok()).unwrap_or(1.0);

    if sample_rate >= 1.0 {
        Sampler::AlwaysOn
    } else if sample_rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(sample_rate)
    }
}

/// Initialize the complete tracing stack (console + OpenTelemetry)
pub fn init_tracing_stack(service_name: &str) -> anyhow::Result<()> {
    let tracer = init_telemetry(service_name)?;
    let otel_layer = OpenTelemetryLayer::new(tracer);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_thread_ids(true)
        .with_thread_names(true);

    Registry::default()
        .with(env_filter())
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install subscriber: {}", e))?;

    Ok(())
}

/// Shutdown OpenTelemetry provider
pub fn shutdown_telemetry() {
    opentelemetry::global::shutdown_tracer_provider();
}

/// Span wrapping one auth decision. `outcome` is filled in by [`record_outcome`].
pub fn auth_decision_span(email: &str, required_role: &str) -> tracing::Span {
    tracing::info_span!(
        "auth_decision",
        email = %email,
        required_role = %required_role,
        outcome = tracing::field::Empty,
        otel.kind = "server",
        otel.status_code = tracing::field::Empty,
    )
}

/// Record the decision outcome in `span`
pub fn record_outcome(span: &tracing::Span, outcome: &str, failed: bool) {
    span.record("outcome", outcome);
    span.record("otel.status_code", if failed { "ERROR" } else { "OK" });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::subscriber::with_default;

    #[test]
    fn test_sampler_from_values() {
        assert!(matches!(sampler_from(Some("1.0")), Sampler::AlwaysOn));
        assert!(matches!(sampler_from(Some("2.0")), Sampler::AlwaysOn));
        assert!(matches!(sampler_from(Some("0.0")), Sampler::AlwaysOff));
        assert!(matches!(sampler_from(Some("-0.5")), Sampler::AlwaysOff));
        assert!(matches!(
            sampler_from(Some("0.25")),
            Sampler::TraceIdRatioBased(_)
        ));
    }

    #[test]
    fn test_sampler_defaults_to_always_on() {
        assert!(matches!(sampler_from(None), Sampler::AlwaysOn));
        assert!(matches!(sampler_from(Some("invalid")), Sampler::AlwaysOn));
    }

    #[test]
    fn test_auth_decision_span() {
        let subscriber = Registry::default();
        with_default(subscriber, || {
            let span = auth_decision_span("a@example.com", "admin");
            assert_eq!(span.metadata().unwrap().name(), "auth_decision");

            let _guard = span.enter();
            record_outcome(&span, "forbidden", false);
        });
    }

    #[test]
    fn test_shutdown_telemetry() {
        shutdown_telemetry();
    }
}

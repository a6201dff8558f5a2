//! bookgate resource API service binary

use bookgate_core::Settings;
use bookgate_server::{metrics, server, tracing as telemetry, Service};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let service = Service::Api;
    let otel = telemetry::otel_enabled();
    telemetry::init(service.name(), otel)?;

    metrics::init_prometheus()?;
    metrics::init_metrics();

    let settings = Settings::load(None)?;
    let result = server::run(service, settings).await;

    if otel {
        tracing::info!("Flushing OpenTelemetry traces...");
        telemetry::shutdown_telemetry();
    }

    result
}

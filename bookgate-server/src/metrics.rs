//! Prometheus metrics collection for the bookgate services

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Initialize all metric descriptions
pub fn init_metrics() {
    // Counters
    describe_counter!("bookgate_auth_decisions_total", "Total number of auth decisions by outcome");
    describe_counter!("bookgate_users_created_total", "Users created on first authenticated request");
    describe_counter!("bookgate_books_created_total", "Books created through the API");
    describe_counter!("bookgate_role_updates_total", "Role updates, labelled by whether a row matched");
    describe_counter!("bookgate_book_rows_skipped_total", "Book rows skipped because they failed to decode");
    describe_counter!("bookgate_store_errors_total", "Store failures surfaced as 500 responses");

    // Histograms
    describe_histogram!("bookgate_auth_latency_seconds", "Auth decision latency in seconds");
}

/// Record an auth decision
pub fn record_decision(outcome: &str, latency_seconds: f64) {
    counter!("bookgate_auth_decisions_total", 1, "outcome" => outcome.to_string());
    histogram!("bookgate_auth_latency_seconds", latency_seconds);
}

/// Record a created book
pub fn record_book_created() {
    counter!("bookgate_books_created_total", 1);
}

/// Record a role update
pub fn record_role_update(rows_affected: u64) {
    let matched = if rows_affected > 0 { "true" } else { "false" };
    counter!("bookgate_role_updates_total", 1, "matched" => matched);
}

/// Record a store failure reported to a client
pub fn record_store_error(operation: &str) {
    counter!("bookgate_store_errors_total", 1, "operation" => operation.to_string());
}

/// Storage for Prometheus handle
static PROMETHEUS_HANDLE: std::sync::OnceLock<metrics_exporter_prometheus::PrometheusHandle> =
    std::sync::OnceLock::new();

/// Install the Prometheus recorder. Calling it again is a no-op.
pub fn init_prometheus() -> anyhow::Result<()> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let handle = builder.install_recorder()?;
    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("Failed to set Prometheus handle"))?;
    Ok(())
}

/// Get Prometheus metrics string
pub fn get_prometheus_metrics() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Prometheus metrics not initialized\n".to_string())
}

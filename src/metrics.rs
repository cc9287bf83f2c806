// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics and the probe/metrics HTTP endpoint.
//!
//! Metrics use the `gwdns_` namespace and are served together with the
//! liveness and readiness probes from a single bind address:
//!
//! - `/metrics` - Prometheus text exposition
//! - `/healthz` - liveness probe
//! - `/readyz` - readiness probe

use axum::routing::get;
use axum::Router;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::info;

/// Namespace prefix for all gwdns metrics
const METRICS_NAMESPACE: &str = "gwdns";

/// Global Prometheus metrics registry, exposed via `/metrics`.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total reconciliations by outcome.
///
/// Labels:
/// - `status`: `success` or `error`
pub static RECONCILIATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of HTTPRoute reconciliations by outcome",
    );
    let counter = CounterVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total DNS backend mutations by operation and outcome.
///
/// Labels:
/// - `operation`: `create`, `upsert`, or `delete`
/// - `status`: `success` or `error`
pub static DNS_OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_dns_operations_total"),
        "Total number of DNS backend operations by operation and outcome",
    );
    let counter = CounterVec::new(opts, &["operation", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliation passes in seconds.
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of HTTPRoute reconciliation passes in seconds",
    )
    .buckets(vec![0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Record the outcome and duration of one reconciliation pass.
pub fn record_reconciliation(success: bool, duration: Duration) {
    let status = if success { "success" } else { "error" };
    RECONCILIATIONS_TOTAL.with_label_values(&[status]).inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[status])
        .observe(duration.as_secs_f64());
}

/// Record the outcome of one DNS backend operation.
pub fn record_dns_operation(operation: &str, success: bool) {
    let status = if success { "success" } else { "error" };
    DNS_OPERATIONS_TOTAL
        .with_label_values(&[operation, status])
        .inc();
}

/// Encode the registry in Prometheus text format.
#[must_use]
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder
        .encode(&METRICS_REGISTRY.gather(), &mut buffer)
        .is_err()
    {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Serve `/metrics`, `/healthz`, and `/readyz` on the given address.
///
/// Runs until the listener fails; intended to be spawned as a background
/// task from `main`.
///
/// # Errors
///
/// Returns an error when the listener cannot bind or the server exits.
pub async fn serve(addr: &str) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/metrics", get(|| async { render() }))
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(|| async { "ok" }));

    info!(addr, "starting metrics and probe server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;

//! Prometheus metrics for the Pinmark server.
//!
//! Counters cover the write path (inspect, mark), the catalog path (delete)
//! and the record store (create, sync). They are exposed at `/metrics` when
//! `server.metrics_enabled` is set.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{self, Encoder, IntCounter, Registry, TextEncoder};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static IMAGES_INSPECTED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pinmark_images_inspected_total",
        "Total number of images whose dimensions were reported",
    )
    .expect("metric creation failed")
});

pub static IMAGES_MARKED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pinmark_images_marked_total",
        "Total number of images marked and stored",
    )
    .expect("metric creation failed")
});

pub static MARK_FAILURES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pinmark_mark_failures_total",
        "Total number of marking requests that failed",
    )
    .expect("metric creation failed")
});

pub static IMAGES_DELETED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pinmark_images_deleted_total",
        "Total number of stored images deleted",
    )
    .expect("metric creation failed")
});

pub static RECORDS_CREATED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pinmark_records_created_total",
        "Total number of image records created through the API",
    )
    .expect("metric creation failed")
});

pub static RECORDS_SYNCED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pinmark_records_synced_total",
        "Total number of image records added by folder sync",
    )
    .expect("metric creation failed")
});

static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
/// Safe to call more than once.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        for counter in [
            &*IMAGES_INSPECTED,
            &*IMAGES_MARKED,
            &*MARK_FAILURES,
            &*IMAGES_DELETED,
            &*RECORDS_CREATED,
            &*RECORDS_SYNCED,
        ] {
            REGISTRY
                .register(Box::new(counter.clone()))
                .expect("metric registration failed");
        }
    });
}

/// Handler for the /metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static LISTINGS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("listings_created_total", "Dog listings committed")
        .expect("register listings_created_total")
});

pub static LISTINGS_DELETED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("listings_deleted_total", "Dog listings deleted")
        .expect("register listings_deleted_total")
});

pub static UPLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!("uploads_total", "Files relayed to object storage", &["kind"])
        .expect("register uploads_total")
});

pub static IMAGE_CLEANUP_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("image_cleanup_failures_total", "Listing images left behind after a failed removal")
        .expect("register image_cleanup_failures_total")
});

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

/// Touch every counter so they appear on `/metrics` before the first event.
pub fn register_all() {
    Lazy::force(&LISTINGS_CREATED_TOTAL);
    Lazy::force(&LISTINGS_DELETED_TOTAL);
    Lazy::force(&UPLOADS_TOTAL);
    Lazy::force(&IMAGE_CLEANUP_FAILURES_TOTAL);
}

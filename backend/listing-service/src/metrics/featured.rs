use lazy_static::lazy_static;
use prometheus::{register_histogram, register_int_counter_vec, Histogram, IntCounterVec};

lazy_static! {
    /// Time spent loading candidates and drawing the featured set.
    pub static ref FEATURED_SELECTION_DURATION_SECONDS: Histogram = register_histogram!(
        "featured_selection_duration_seconds",
        "Featured feed assembly duration, store reads included",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("failed to register featured_selection_duration_seconds");

    /// Eligible pool size seen per request.
    pub static ref FEATURED_POOL_SIZE: Histogram = register_histogram!(
        "featured_pool_size",
        "Number of eligible featured listings per request",
        vec![0.0, 1.0, 3.0, 6.0, 10.0, 25.0, 50.0, 100.0, 250.0]
    )
    .expect("failed to register featured_pool_size");

    /// Featured feed requests by outcome (ok/error).
    pub static ref FEATURED_REQUEST_TOTAL: IntCounterVec = register_int_counter_vec!(
        "featured_request_total",
        "Featured feed requests segmented by outcome",
        &["result"]
    )
    .expect("failed to register featured_request_total");
}

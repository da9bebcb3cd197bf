use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

lazy_static! {
    /// HTTP requests by method and status code.
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "listing_http_requests_total",
        "HTTP requests handled by listing-service",
        &["method", "status"]
    )
    .expect("failed to register listing_http_requests_total");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "listing_http_request_duration_seconds",
        "HTTP request latency",
        &["method"]
    )
    .expect("failed to register listing_http_request_duration_seconds");
}

//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with standardized naming conventions.
//! Latency buckets are split between fast HTTP handling and slow model calls.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Precis metrics
pub const METRICS_PREFIX: &str = "precis";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
    60.00,  // 60s
];

/// Buckets for generative model latency (much slower than local work)
pub const MODEL_BUCKETS: &[f64] = &[
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.000,  // 2s
    5.000,  // 5s
    10.00,  // 10s
    20.00,  // 20s
    30.00,  // 30s
    60.00,  // 60s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Extraction metrics
    describe_counter!(
        format!("{}_extractions_total", METRICS_PREFIX),
        Unit::Count,
        "Total text extractions by format and outcome"
    );

    describe_histogram!(
        format!("{}_extraction_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Text extraction latency in seconds"
    );

    // Summary metrics
    describe_counter!(
        format!("{}_summaries_total", METRICS_PREFIX),
        Unit::Count,
        "Total summaries produced by outcome"
    );

    describe_histogram!(
        format!("{}_summary_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "End-to-end summarization latency in seconds"
    );

    // Model metrics
    describe_counter!(
        format!("{}_model_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total generative model API requests"
    );

    describe_histogram!(
        format!("{}_model_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Generative model latency in seconds"
    );

    describe_counter!(
        format!("{}_model_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total generative model API errors"
    );

    // Export metrics
    describe_counter!(
        format!("{}_exports_total", METRICS_PREFIX),
        Unit::Count,
        "Total exports rendered by format"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

fn status_label(success: bool) -> &'static str {
    if success { "success" } else { "error" }
}

/// Record a text extraction
pub fn record_extraction(duration_secs: f64, format: &str, success: bool) {
    counter!(
        format!("{}_extractions_total", METRICS_PREFIX),
        "format" => format.to_string(),
        "status" => status_label(success)
    )
    .increment(1);

    histogram!(
        format!("{}_extraction_duration_seconds", METRICS_PREFIX),
        "format" => format.to_string()
    )
    .record(duration_secs);
}

/// Record a finished summary; `outcome` is `success`, `empty` or `degraded`
pub fn record_summary(duration_secs: f64, outcome: &'static str) {
    counter!(
        format!("{}_summaries_total", METRICS_PREFIX),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(format!("{}_summary_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

/// Record a generative model call
pub fn record_model_call(duration_secs: f64, model: &str, success: bool) {
    counter!(
        format!("{}_model_requests_total", METRICS_PREFIX),
        "model" => model.to_string(),
        "status" => status_label(success)
    )
    .increment(1);

    if success {
        histogram!(
            format!("{}_model_duration_seconds", METRICS_PREFIX),
            "model" => model.to_string()
        )
        .record(duration_secs);
    } else {
        counter!(
            format!("{}_model_errors_total", METRICS_PREFIX),
            "model" => model.to_string()
        )
        .increment(1);
    }
}

/// Record a rendered export
pub fn record_export(format: &str) {
    counter!(
        format!("{}_exports_total", METRICS_PREFIX),
        "format" => format.to_string()
    )
    .increment(1);
}

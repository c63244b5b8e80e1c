//! Metrics and observability utilities
//!
//! Prometheus metrics with standardized naming conventions.

use metrics::{
    counter, describe_counter, describe_histogram, histogram, Unit,
};

/// Metrics prefix for all Vaultify metrics
pub const METRICS_PREFIX: &str = "vaultify";

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

    // Upload metrics
    describe_counter!(
        format!("{}_papers_uploaded_total", METRICS_PREFIX),
        Unit::Count,
        "Total papers uploaded"
    );

    describe_counter!(
        format!("{}_duplicate_rejections_total", METRICS_PREFIX),
        Unit::Count,
        "Uploads rejected by the duplicate checker"
    );

    // Generation metrics
    describe_counter!(
        format!("{}_generation_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total generative-AI requests"
    );

    describe_histogram!(
        format!("{}_generation_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Generative-AI request latency in seconds"
    );

    describe_counter!(
        format!("{}_generation_denied_total", METRICS_PREFIX),
        Unit::Count,
        "Generation attempts denied by the local request quota"
    );

    // Cache metrics
    describe_counter!(
        format!("{}_cache_hits_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache hits"
    );

    describe_counter!(
        format!("{}_cache_misses_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache misses"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record a generation call outcome
pub fn record_generation(duration_secs: f64, model: &str, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_generation_requests_total", METRICS_PREFIX),
        "model" => model.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    if success {
        histogram!(
            format!("{}_generation_duration_seconds", METRICS_PREFIX),
            "model" => model.to_string()
        )
        .record(duration_secs);
    }
}

/// Helper to record a quota denial
pub fn record_quota_denied() {
    counter!(format!("{}_generation_denied_total", METRICS_PREFIX)).increment(1);
}

/// Helper to record cache metrics
pub fn record_cache(hit: bool, cache_name: &str) {
    if hit {
        counter!(
            format!("{}_cache_hits_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    } else {
        counter!(
            format!("{}_cache_misses_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    }
}

/// Helper to record an upload
pub fn record_upload(rejected_duplicate: bool) {
    if rejected_duplicate {
        counter!(format!("{}_duplicate_rejections_total", METRICS_PREFIX)).increment(1);
    } else {
        counter!(format!("{}_papers_uploaded_total", METRICS_PREFIX)).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_does_not_panic() {
        record_generation(0.5, "gemini-2.5-flash", true);
        record_generation(0.1, "gemini-2.5-pro", false);
        record_quota_denied();
        record_cache(true, "paper_content");
        record_upload(false);
        record_upload(true);
    }
}

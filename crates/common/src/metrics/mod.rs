//! Metrics and observability utilities
//!
//! Metric descriptions plus small recording helpers so call sites stay
//! one line. Exporting is the binary's job.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

/// Metrics prefix for all Pagewise metrics
pub const METRICS_PREFIX: &str = "pagewise";

/// Histogram buckets for capability latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005, // 5ms
    0.010, // 10ms
    0.025, // 25ms
    0.050, // 50ms
    0.100, // 100ms
    0.250, // 250ms
    0.500, // 500ms
    1.000, // 1s
    2.500, // 2.5s
    5.000, // 5s
    10.00, // 10s
    30.00, // 30s
    60.00, // 60s
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_questions_total", METRICS_PREFIX),
        Unit::Count,
        "Questions answered, by route"
    );

    describe_histogram!(
        format!("{}_retrieval_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Vector index search latency in seconds"
    );

    describe_gauge!(
        format!("{}_retrieval_results_count", METRICS_PREFIX),
        Unit::Count,
        "Number of chunks returned by the last search"
    );

    describe_counter!(
        format!("{}_generation_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Language model calls, by model and status"
    );

    describe_histogram!(
        format!("{}_generation_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Language model latency in seconds, retries included"
    );

    describe_counter!(
        format!("{}_sufficiency_verdicts_total", METRICS_PREFIX),
        Unit::Count,
        "Context sufficiency decisions"
    );

    describe_counter!(
        format!("{}_embedding_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total embedding API requests"
    );

    describe_histogram!(
        format!("{}_embedding_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Embedding generation latency in seconds"
    );

    describe_counter!(
        format!("{}_documents_ingested_total", METRICS_PREFIX),
        Unit::Count,
        "Documents ingested, by provenance mode"
    );

    describe_counter!(
        format!("{}_chunks_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total chunks created"
    );

    describe_histogram!(
        format!("{}_ingestion_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Document ingestion latency in seconds"
    );

    tracing::info!("Metrics registered");
}

fn status_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}

/// Count one answered question
pub fn record_question(route: &str) {
    counter!(
        format!("{}_questions_total", METRICS_PREFIX),
        "route" => route.to_string()
    )
    .increment(1);
}

pub fn record_retrieval(duration_secs: f64, result_count: usize) {
    histogram!(format!("{}_retrieval_duration_seconds", METRICS_PREFIX)).record(duration_secs);
    gauge!(format!("{}_retrieval_results_count", METRICS_PREFIX)).set(result_count as f64);
}

pub fn record_generation(duration_secs: f64, model: &str, success: bool) {
    counter!(
        format!("{}_generation_requests_total", METRICS_PREFIX),
        "model" => model.to_string(),
        "status" => status_label(success)
    )
    .increment(1);

    histogram!(
        format!("{}_generation_duration_seconds", METRICS_PREFIX),
        "model" => model.to_string()
    )
    .record(duration_secs);
}

pub fn record_sufficiency(sufficient: bool) {
    let verdict = if sufficient { "sufficient" } else { "insufficient" };
    counter!(
        format!("{}_sufficiency_verdicts_total", METRICS_PREFIX),
        "verdict" => verdict
    )
    .increment(1);
}

/// Helper to record embedding metrics
pub fn record_embedding(duration_secs: f64, model: &str, batch_size: usize, success: bool) {
    counter!(
        format!("{}_embedding_requests_total", METRICS_PREFIX),
        "model" => model.to_string(),
        "status" => status_label(success)
    )
    .increment(1);

    if success {
        histogram!(
            format!("{}_embedding_duration_seconds", METRICS_PREFIX),
            "model" => model.to_string()
        )
        .record(duration_secs);
        tracing::trace!(model, batch_size, "Embedding batch recorded");
    }
}

/// Helper to record ingestion metrics
pub fn record_ingestion(duration_secs: f64, chunks_created: usize, mode: &str) {
    counter!(
        format!("{}_documents_ingested_total", METRICS_PREFIX),
        "mode" => mode.to_string()
    )
    .increment(1);

    counter!(format!("{}_chunks_created_total", METRICS_PREFIX)).increment(chunks_created as u64);

    histogram!(format!("{}_ingestion_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_recording_without_recorder() {
        // No recorder installed: every helper is a no-op
        record_question("doc_strict");
        record_retrieval(0.01, 5);
        record_generation(0.2, "model", false);
        record_sufficiency(true);
        record_ingestion(1.0, 12, "page_aware");
    }
}

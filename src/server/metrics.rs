use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, IntCounter, Opts, Registry, TextEncoder,
};
use std::time::Duration;
use tracing::info;

/// Metric name prefix for all smuggler metrics
const PREFIX: &str = "smuggler";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Ingestion Metrics
    pub static ref INGESTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_ingestions_total"), "Track ingestions by per-store outcome"),
        &["catalog", "blob"]
    ).expect("Failed to create ingestions_total metric");

    pub static ref UPLOADED_BYTES_TOTAL: IntCounter = IntCounter::new(
        format!("{PREFIX}_uploaded_bytes_total"),
        "Total bytes received in uploads"
    ).expect("Failed to create uploaded_bytes_total metric");

    // Downstream Metrics
    pub static ref CATALOG_CALLS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_catalog_calls_total"), "Calls made to the catalog service"),
        &["resource", "outcome"]
    ).expect("Failed to create catalog_calls_total metric");

    pub static ref BLOB_STORE_CALLS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_blob_store_calls_total"), "Calls made to the blob store"),
        &["operation", "outcome"]
    ).expect("Failed to create blob_store_calls_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(INGESTIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(UPLOADED_BYTES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CATALOG_CALLS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(BLOB_STORE_CALLS_TOTAL.clone()));

    info!("Metrics system initialized successfully");
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

pub fn record_ingestion(catalog_outcome: &str, blob_outcome: &str) {
    INGESTIONS_TOTAL
        .with_label_values(&[catalog_outcome, blob_outcome])
        .inc();
}

pub fn record_upload_bytes(bytes: usize) {
    UPLOADED_BYTES_TOTAL.inc_by(bytes as u64);
}

pub fn record_catalog_call(resource: &str, outcome: &str) {
    CATALOG_CALLS_TOTAL
        .with_label_values(&[resource, outcome])
        .inc();
}

pub fn record_blob_store_call(operation: &str, outcome: &str) {
    BLOB_STORE_CALLS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Collapse ids out of a request path so label cardinality stays bounded.
pub fn categorize_endpoint(path: &str) -> &'static str {
    let path = path.trim_start_matches("/api/v1");
    if path.starts_with("/holding_groups/") && path.contains("/music/") {
        "music"
    } else if path.starts_with("/holdings/") && path.ends_with("/albumart") {
        "albumart"
    } else if path.starts_with("/holdings/") && path.ends_with("/lock") {
        "lock"
    } else if path.starts_with("/holdings/") && path.ends_with("/source") {
        "source"
    } else if path.starts_with("/torrents/") {
        "torrents"
    } else if path.is_empty() || path == "/" {
        "version"
    } else {
        "other"
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_else(|_| String::from(""));
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}

/// Serve `/metrics` on its own port.
pub async fn run_metrics_server(port: u16) -> anyhow::Result<()> {
    let app = Router::new().route("/metrics", get(metrics_handler));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Metrics available at port {}", port);
    Ok(axum::serve(listener, app).await?)
}

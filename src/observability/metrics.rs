//! Metrics collection and exposition.
//!
//! # Metrics
//! - `backend_requests_total` (counter): requests by server id, status
//! - `backend_request_duration_seconds` (histogram): handler latency
//! - `backend_malformed_headers_total` (counter): rejected shard assignments

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::StatusCode;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::shard::ServerId;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed request.
pub fn record_request(server_id: ServerId, status: StatusCode, start_time: Instant) {
    let server_id = server_id.to_string();
    counter!(
        "backend_requests_total",
        "server_id" => server_id.clone(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    histogram!("backend_request_duration_seconds", "server_id" => server_id)
        .record(start_time.elapsed().as_secs_f64());
}

/// Record a request rejected for a malformed `x-shard-assignment`.
pub fn record_malformed_header(server_id: ServerId) {
    counter!("backend_malformed_headers_total", "server_id" => server_id.to_string()).increment(1);
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router answering GET on every path (a single fallback)
//! - Wire up middleware (request id, tracing, timeout)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::config::BackendConfig;
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::http::responder::{respond, Responder};
use crate::shard::ServerId;

/// HTTP server for one backend instance.
pub struct HttpServer {
    router: Router,
    server_id: ServerId,
}

impl HttpServer {
    /// Create a new HTTP server. The configuration must already be validated.
    pub fn new(config: &BackendConfig, server_id: ServerId) -> Self {
        let responder = Arc::new(Responder::new(server_id, config.listener.cluster_size));
        let router = build_router(responder, Duration::from_secs(config.timeouts.request_secs));
        Self { router, server_id }
    }

    /// The fully layered router, for driving requests in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            server_id = %self.server_id,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
///
/// Layers run top to bottom: request id assignment, request id
/// propagation, the per-request log line, then the timeout.
#[allow(deprecated)]
pub fn build_router(responder: Arc<Responder>, request_timeout: Duration) -> Router {
    let server_id = responder.server_id();

    let trace = TraceLayer::new_for_http()
        .make_span_with(move |request: &Request<Body>| {
            tracing::info_span!(
                "request",
                server_id = %server_id,
                request_id = %request_id(request.headers()),
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            )
        })
        .on_request(())
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Micros),
        );

    Router::new()
        .fallback(get(respond))
        .with_state(responder)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), UuidRequestId))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
                .layer(trace)
                .layer(TimeoutLayer::new(request_timeout)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    use axum::http::{HeaderValue, StatusCode};
    use tower::ServiceExt;
    use tracing_subscriber::{fmt, layer::SubscriberExt};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn router() -> Router {
        let config = BackendConfig::default();
        HttpServer::new(&config, ServerId::new(4).unwrap()).router()
    }

    #[tokio::test]
    async fn test_any_path_is_answered() {
        for uri in ["/", "/orders", "/a/b/c?x=1"] {
            let response = router()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "uri {}", uri);
        }
    }

    #[tokio::test]
    async fn test_request_id_is_assigned_and_propagated() {
        let response = router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key(&X_REQUEST_ID));

        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers().get(&X_REQUEST_ID).unwrap(), "abc-123");
    }

    #[tokio::test]
    async fn test_non_get_is_rejected() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/orders")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_non_utf8_assignment_is_bad_request() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("x-shard-assignment", HeaderValue::from_bytes(b"0,\xff").unwrap())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(axum::http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(body["error"].as_str().unwrap().contains("position 1"));
    }

    #[tokio::test]
    async fn test_one_log_line_per_request() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(move || writer.clone()),
        );
        let _guard = tracing::subscriber::set_default(subscriber);

        let response = router()
            .oneshot(Request::builder().uri("/orders?id=7").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let output = logs.contents();
        let lines: Vec<&str> = output
            .lines()
            .filter(|line| line.contains("finished processing request"))
            .collect();
        assert_eq!(lines.len(), 1, "log output: {}", output);
        assert!(lines[0].contains("server_id=4"), "log line: {}", lines[0]);
        assert!(lines[0].contains("status=200"), "log line: {}", lines[0]);
    }
}

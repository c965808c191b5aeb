//! Request inspection.
//!
//! # Responsibilities
//! - Name the routing headers the balancer attaches
//! - Read them as optional strings, nothing more
//! - Generate a request ID when the client did not send one
//!
//! # Design Decisions
//! - Header names are case-insensitive (`HeaderMap` normalizes them)
//! - Only the first value of a repeated header is read
//! - Non UTF-8 values are decoded lossily instead of rejected
//! - Parsing lives in `shard::assignment`, not here

use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Comma-separated host indices eligible for the client.
pub static X_SHARD_ASSIGNMENT: HeaderName = HeaderName::from_static("x-shard-assignment");

/// Opaque client identifier.
pub static X_CUSTOMER_ID: HeaderName = HeaderName::from_static("x-customer-id");

/// Host index the balancer routed this request to.
pub static X_TARGET_HOST: HeaderName = HeaderName::from_static("x-target-host");

/// Correlation id, echoed on every response.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Routing metadata as received, before any parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingMetadata {
    pub customer_id: Option<String>,
    pub shard_assignment: Option<String>,
    pub target_host: Option<String>,
}

impl RoutingMetadata {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            customer_id: header_str(headers, &X_CUSTOMER_ID),
            shard_assignment: header_str(headers, &X_SHARD_ASSIGNMENT),
            target_host: header_str(headers, &X_TARGET_HOST),
        }
    }
}

fn header_str(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

/// Request target as sent by the client: path plus query string.
pub fn request_target(uri: &Uri) -> &str {
    uri.path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path())
}

/// Request ID value, or `-` if none has been assigned.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

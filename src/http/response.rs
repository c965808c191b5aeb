//! Response rendering.
//!
//! # Responsibilities
//! - Define the diagnostic body returned on every successful request
//! - Render bodies as indented JSON with a stable key order
//! - Map malformed routing headers to a complete 400 response
//!
//! # Design Decisions
//! - Field order in `DiagnosticResponse` is the wire key order
//! - Bodies are fully rendered before the status line is written

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::shard::{MalformedHeaderError, ServerId, ShardAssignment};

/// What this instance observed about a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticResponse {
    pub server_id: ServerId,
    pub path: String,
    pub customer_id: Option<String>,
    /// Shard membership in server id space, e.g. `"[1,4,6]"`.
    pub shard_assignment: Option<ShardAssignment>,
    /// Echoed exactly as received; not re-based.
    pub target_host_index: Option<String>,
    pub note: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Render `body` as indented JSON with the given status.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_string_pretty(body) {
        Ok(json) => (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            json,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response body");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to serialize response").into_response()
        }
    }
}

impl IntoResponse for DiagnosticResponse {
    fn into_response(self) -> Response {
        json_response(StatusCode::OK, &self)
    }
}

impl IntoResponse for MalformedHeaderError {
    fn into_response(self) -> Response {
        json_response(
            StatusCode::BAD_REQUEST,
            &ErrorBody {
                error: self.to_string(),
            },
        )
    }
}

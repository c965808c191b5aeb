//! The request responder.
//!
//! Every GET, on any path, is answered with a description of the routing
//! metadata the balancer attached. The server id is fixed when the
//! responder is built and shared read-only across requests.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::{HeaderMap, Uri};
use axum::response::{IntoResponse, Response};

use crate::http::request::{request_target, RoutingMetadata};
use crate::http::response::DiagnosticResponse;
use crate::observability::metrics;
use crate::shard::{MalformedHeaderError, ServerId, ShardAssignment};

/// Builds diagnostics for one backend instance.
#[derive(Debug, Clone)]
pub struct Responder {
    server_id: ServerId,
    note: String,
}

impl Responder {
    /// `cluster_size` is the number of instances behind the balancer and
    /// only shapes the explanatory note.
    pub fn new(server_id: ServerId, cluster_size: u32) -> Self {
        Self {
            server_id,
            note: index_note(cluster_size),
        }
    }

    pub fn server_id(&self) -> ServerId {
        self.server_id
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    /// Describe a request. Fails only when the shard assignment is malformed.
    pub fn describe(
        &self,
        path: &str,
        metadata: RoutingMetadata,
    ) -> Result<DiagnosticResponse, MalformedHeaderError> {
        let shard_assignment = metadata
            .shard_assignment
            .as_deref()
            .map(str::parse::<ShardAssignment>)
            .transpose()?;

        Ok(DiagnosticResponse {
            server_id: self.server_id,
            path: path.to_string(),
            customer_id: metadata.customer_id,
            shard_assignment,
            target_host_index: metadata.target_host,
            note: self.note.clone(),
        })
    }
}

fn index_note(cluster_size: u32) -> String {
    format!(
        "Host index 0-{} maps to Server ID 1-{}",
        cluster_size.saturating_sub(1),
        cluster_size
    )
}

/// Axum handler answering every routed GET.
pub async fn respond(
    State(responder): State<Arc<Responder>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();
    let metadata = RoutingMetadata::from_headers(&headers);

    tracing::debug!(
        customer_id = ?metadata.customer_id,
        shard_assignment = ?metadata.shard_assignment,
        target_host = ?metadata.target_host,
        "Routing metadata received"
    );

    let response = match responder.describe(request_target(&uri), metadata) {
        Ok(diagnostic) => diagnostic.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting request with malformed routing header");
            metrics::record_malformed_header(responder.server_id());
            e.into_response()
        }
    };

    metrics::record_request(responder.server_id(), response.status(), start_time);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responder(id: u32) -> Responder {
        Responder::new(ServerId::new(id).unwrap(), 8)
    }

    #[test]
    fn test_full_routing_metadata() {
        let metadata = RoutingMetadata {
            customer_id: Some("cust-42".to_string()),
            shard_assignment: Some("0,3,5".to_string()),
            target_host: Some("2".to_string()),
        };

        let diagnostic = responder(3).describe("/orders?id=7", metadata).unwrap();
        assert_eq!(diagnostic.server_id.get(), 3);
        assert_eq!(diagnostic.path, "/orders?id=7");
        assert_eq!(diagnostic.customer_id.as_deref(), Some("cust-42"));
        assert_eq!(diagnostic.shard_assignment.unwrap().to_string(), "[1,4,6]");
        assert_eq!(diagnostic.target_host_index.as_deref(), Some("2"));
        assert_eq!(diagnostic.note, "Host index 0-7 maps to Server ID 1-8");
    }

    #[test]
    fn test_no_routing_headers() {
        let diagnostic = responder(5)
            .describe("/", RoutingMetadata::default())
            .unwrap();
        assert_eq!(diagnostic.server_id.get(), 5);
        assert_eq!(diagnostic.path, "/");
        assert!(diagnostic.customer_id.is_none());
        assert!(diagnostic.shard_assignment.is_none());
        assert!(diagnostic.target_host_index.is_none());
    }

    #[test]
    fn test_target_host_is_not_rebased() {
        let metadata = RoutingMetadata {
            target_host: Some("7".to_string()),
            ..RoutingMetadata::default()
        };
        let diagnostic = responder(8).describe("/", metadata).unwrap();
        assert_eq!(diagnostic.target_host_index.as_deref(), Some("7"));
    }

    #[test]
    fn test_malformed_assignment_fails_whole_request() {
        let metadata = RoutingMetadata {
            customer_id: Some("cust-42".to_string()),
            shard_assignment: Some("0,x,5".to_string()),
            target_host: None,
        };
        assert!(matches!(
            responder(1).describe("/", metadata),
            Err(MalformedHeaderError::InvalidHostIndex { position: 1, .. })
        ));
    }

    #[test]
    fn test_note_follows_cluster_size() {
        let id = ServerId::new(1).unwrap();
        assert_eq!(Responder::new(id, 8).note(), "Host index 0-7 maps to Server ID 1-8");
        assert_eq!(Responder::new(id, 3).note(), "Host index 0-2 maps to Server ID 1-3");
        assert_eq!(Responder::new(id, 1).note(), "Host index 0-0 maps to Server ID 1-1");
    }
}

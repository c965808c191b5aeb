//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the server id against the cluster size
//! - Validate value ranges (timeouts > 0, derived port fits)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: (BackendConfig, ServerId) → Result<(), Vec<ValidationError>>
//! - Runs before any listener is bound

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::BackendConfig;
use crate::shard::ServerId;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.cluster_size must be at least 1")]
    EmptyCluster,

    #[error("server id {server_id} is outside the cluster (1-{cluster_size})")]
    ServerIdOutOfRange { server_id: ServerId, cluster_size: u32 },

    #[error("listener.base_port {base_port} + server id {server_id} exceeds 65535")]
    PortOverflow { base_port: u16, server_id: ServerId },

    #[error("timeouts.request_secs must be greater than 0")]
    ZeroRequestTimeout,

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration for the instance with the given id.
pub fn validate_config(config: &BackendConfig, server_id: ServerId) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let listener = &config.listener;

    if listener.cluster_size == 0 {
        errors.push(ValidationError::EmptyCluster);
    } else if server_id.get() > listener.cluster_size {
        errors.push(ValidationError::ServerIdOutOfRange {
            server_id,
            cluster_size: listener.cluster_size,
        });
    }

    if listener.port_for(server_id).is_none() {
        errors.push(ValidationError::PortOverflow {
            base_port: listener.base_port,
            server_id,
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

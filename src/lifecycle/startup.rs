//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration and apply command line overrides
//! - Validate it against the server id
//! - Bind the listener on `base_port + server_id`
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Requests are only served once a valid server id is established

use std::path::PathBuf;

use clap::Args;
use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_config, validate_config, BackendConfig, ConfigError, ValidationError};
use crate::shard::ServerId;

/// Fatal errors before the server accepts traffic.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {host}:{port}: {source}")]
    Bind {
        host: String,
        port: u16,
        source: std::io::Error,
    },

    #[error("failed to start metrics endpoint: {0}")]
    Metrics(#[from] BuildError),
}

/// Command line settings that take precedence over the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Host to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Base port; the server listens on base_port + SERVER_ID
    #[arg(long)]
    pub base_port: Option<u16>,

    /// Number of instances behind the balancer
    #[arg(long)]
    pub cluster_size: Option<u32>,
}

/// Resolve the effective configuration for `server_id`.
pub fn prepare_config(server_id: ServerId, overrides: &Overrides) -> Result<BackendConfig, StartupError> {
    let mut config = match &overrides.config {
        Some(path) => load_config(path)?,
        None => BackendConfig::default(),
    };

    if let Some(host) = &overrides.host {
        config.listener.host = host.clone();
    }
    if let Some(base_port) = overrides.base_port {
        config.listener.base_port = base_port;
    }
    if let Some(cluster_size) = overrides.cluster_size {
        config.listener.cluster_size = cluster_size;
    }

    validate_config(&config, server_id).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Bind the listener for `server_id`.
pub async fn bind_listener(config: &BackendConfig, server_id: ServerId) -> Result<TcpListener, StartupError> {
    let host = config.listener.host.clone();
    let port = config.listener.port_for(server_id).ok_or_else(|| {
        ConfigError::Validation(vec![ValidationError::PortOverflow {
            base_port: config.listener.base_port,
            server_id,
        }])
    })?;

    let bound = TcpListener::bind((host.as_str(), port)).await;
    bound.map_err(|source| StartupError::Bind { host, port, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: u32) -> ServerId {
        ServerId::new(value).unwrap()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = prepare_config(id(3), &Overrides::default()).unwrap();
        assert_eq!(config.listener.port_for(id(3)), Some(8003));
        assert_eq!(config.listener.host, "127.0.0.1");
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = Overrides {
            host: Some("0.0.0.0".to_string()),
            base_port: Some(9100),
            cluster_size: Some(16),
            ..Overrides::default()
        };
        let config = prepare_config(id(12), &overrides).unwrap();
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.listener.port_for(id(12)), Some(9112));
        assert_eq!(config.listener.cluster_size, 16);
    }

    #[test]
    fn test_server_id_outside_cluster_is_fatal() {
        let err = prepare_config(id(9), &Overrides::default()).unwrap_err();
        assert!(matches!(err, StartupError::Config(ConfigError::Validation(_))));
        assert!(err.to_string().contains("outside the cluster"));
    }

    #[test]
    fn test_missing_config_file_is_fatal() {
        let overrides = Overrides {
            config: Some(PathBuf::from("/nonexistent/shard-backend.toml")),
            ..Overrides::default()
        };
        assert!(matches!(
            prepare_config(id(1), &overrides),
            Err(StartupError::Config(ConfigError::Io(_)))
        ));
    }

    #[tokio::test]
    async fn test_port_in_use_is_fatal() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let mut config = BackendConfig::default();
        config.listener.base_port = port - 1;

        let err = bind_listener(&config, id(1)).await.unwrap_err();
        assert!(matches!(err, StartupError::Bind { port: p, .. } if p == port));
    }
}

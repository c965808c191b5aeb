//! Shared utilities for integration tests.

use std::net::SocketAddr;

use shard_backend::config::BackendConfig;
use shard_backend::http::HttpServer;
use shard_backend::lifecycle::Shutdown;
use shard_backend::shard::ServerId;
use tokio::net::TcpListener;

/// A backend instance running on an ephemeral loopback port.
pub struct TestBackend {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl TestBackend {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a backend with the given server id and default configuration.
pub async fn start_backend(server_id: u32) -> TestBackend {
    let config = BackendConfig::default();
    let server_id = ServerId::new(server_id).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, server_id);
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    TestBackend {
        addr,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

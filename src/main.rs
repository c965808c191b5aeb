//! Shuffle-sharding backend fixture.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │               SHARD BACKEND <id>             │
//!                        │                                              │
//!   Load balancer        │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!   (x-shard-assignment, │  │  http    │──▶│ request  │──▶│responder │  │
//!    x-customer-id,   ───┼─▶│  server  │   │ headers  │   │ +1 shift │  │
//!    x-target-host)      │  └──────────┘   └──────────┘   └────┬─────┘  │
//!                        │                                     │        │
//!   JSON diagnostic      │                               ┌─────▼─────┐  │
//!   ◀────────────────────┼───────────────────────────────│ response  │  │
//!                        │                               └───────────┘  │
//!                        │  config · lifecycle · observability          │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use clap::Parser;

use shard_backend::config::BackendConfig;
use shard_backend::http::HttpServer;
use shard_backend::lifecycle::{bind_listener, prepare_config, Overrides, Shutdown, StartupError};
use shard_backend::observability::{logging, metrics};
use shard_backend::shard::ServerId;

#[derive(Parser)]
#[command(name = "shard-backend")]
#[command(version, about = "Backend fixture reporting the shuffle-sharding metadata it receives", long_about = None)]
struct Cli {
    /// Identity of this instance (1..=cluster size)
    server_id: ServerId,

    #[command(flatten)]
    overrides: Overrides,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Exiting with error");
            eprintln!("shard-backend: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let server_id = cli.server_id;
    let config: BackendConfig = prepare_config(server_id, &cli.overrides)?;

    logging::init(&config.observability);
    tracing::info!(
        server_id = %server_id,
        cluster_size = config.listener.cluster_size,
        request_timeout_secs = config.timeouts.request_secs,
        "shard-backend v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let listener = bind_listener(&config, server_id).await?;

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr).map_err(StartupError::from)?;
        }
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(&config, server_id);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

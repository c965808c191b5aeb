//! Shuffle-sharding backend fixture.
//!
//! Each instance answers every GET with a JSON description of the routing
//! metadata the load balancer attached, so a test harness can check which
//! shard a request landed on.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod shard;

pub use config::BackendConfig;
pub use http::{HttpServer, Responder};
pub use lifecycle::Shutdown;
pub use shard::{HostIndex, ServerId, ShardAssignment};

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request produces:
//!     → logging.rs (one structured line, tagged with the server id)
//!     → metrics.rs (counters, latency histogram)
//!
//! Consumers:
//!     → stdout (pretty for local runs, JSON for log collectors)
//!     → Metrics endpoint (Prometheus scrape, off by default)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the request span
//! - Metric calls are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;

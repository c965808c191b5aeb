//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request id, trace, timeout)
//!     → request.rs (typed access to the routing headers)
//!     → responder.rs (translate shard assignment, build diagnostic)
//!     → response.rs (pretty JSON body or 400 error)
//!     → Send to client
//! ```

pub mod request;
pub mod responder;
pub mod response;
pub mod server;

pub use request::{RoutingMetadata, UuidRequestId, X_CUSTOMER_ID, X_REQUEST_ID, X_SHARD_ASSIGNMENT, X_TARGET_HOST};
pub use responder::Responder;
pub use response::DiagnosticResponse;
pub use server::HttpServer;

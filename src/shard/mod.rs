//! Host index and server identity spaces.
//!
//! # Data Flow
//! ```text
//! x-shard-assignment: "0,3,5"        (HostIndex space, zero-based)
//!     → assignment.rs (parse, validate every token)
//!     → identity.rs (HostIndex + 1 = ServerId)
//!     → "[1,4,6]"                    (ServerId space, one-based)
//! ```
//!
//! # Design Decisions
//! - The balancer speaks zero-based host indices; humans read one-based ids
//! - Translation happens once, at parse time, so a `ShardAssignment` can
//!   never hold an index without a matching server id
//! - A single bad token rejects the whole header

pub mod assignment;
pub mod identity;

pub use assignment::{MalformedHeaderError, ShardAssignment};
pub use identity::{HostIndex, InvalidServerId, ServerId};

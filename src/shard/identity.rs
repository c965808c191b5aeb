//! Server identity and host index types.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// One-based identity of a backend instance (`1..=N`).
///
/// Serialized as a decimal string, which is what the routing test harness
/// compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServerId(NonZeroU32);

/// Zero-based index the balancer uses for the same instance (`0..=N-1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostIndex(pub u32);

/// Error returned when a server id is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("server id must be a positive integer, got {0:?}")]
pub struct InvalidServerId(pub String);

impl ServerId {
    /// Build a server id, rejecting zero.
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// The host index the balancer uses for this instance.
    pub fn host_index(self) -> HostIndex {
        HostIndex(self.0.get() - 1)
    }
}

impl HostIndex {
    /// Translate into identity space. `None` when `index + 1` overflows.
    pub fn server_id(self) -> Option<ServerId> {
        self.0.checked_add(1).and_then(ServerId::new)
    }
}

impl FromStr for ServerId {
    type Err = InvalidServerId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(ServerId::new)
            .ok_or_else(|| InvalidServerId(s.to_string()))
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for HostIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ServerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

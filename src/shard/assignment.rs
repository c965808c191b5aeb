//! Shard assignment parsing.
//!
//! The balancer lists every instance eligible for a client as a
//! comma-separated list of host indices. Parsing translates each entry into
//! identity space and keeps the balancer's order.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::shard::identity::{HostIndex, ServerId};

/// Errors raised while parsing the `x-shard-assignment` header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedHeaderError {
    /// Token is not a decimal non-negative integer.
    #[error("x-shard-assignment: {token:?} at position {position} is not a host index")]
    InvalidHostIndex { position: usize, token: String },

    /// Host index has no server id (`index + 1` overflows).
    #[error("x-shard-assignment: host index {index} at position {position} is out of range")]
    OutOfRange { position: usize, index: u32 },
}

/// Ordered shard membership, held in identity space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardAssignment {
    members: Vec<ServerId>,
}

impl ShardAssignment {
    pub fn members(&self) -> &[ServerId] {
        &self.members
    }

    /// Members as the balancer named them.
    pub fn host_indices(&self) -> impl Iterator<Item = HostIndex> + '_ {
        self.members.iter().map(|id| id.host_index())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FromStr for ShardAssignment {
    type Err = MalformedHeaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // A blank header lists no hosts.
        if s.trim().is_empty() {
            return Ok(Self::default());
        }

        let members = s
            .split(',')
            .enumerate()
            .map(|(position, token)| {
                let index = token.trim().parse::<u32>().map_err(|_| {
                    MalformedHeaderError::InvalidHostIndex {
                        position,
                        token: token.to_string(),
                    }
                })?;
                HostIndex(index)
                    .server_id()
                    .ok_or(MalformedHeaderError::OutOfRange { position, index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { members })
    }
}

/// Renders as `[1,4,6]`.
impl fmt::Display for ShardAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, id) in self.members.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", id)?;
        }
        f.write_str("]")
    }
}

impl Serialize for ShardAssignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

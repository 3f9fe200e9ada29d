//! Table identity and configuration
//!
//! A table configuration names, for every shard, the set of replica servers
//! and the director (the replica that accepts writes).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::server::{ServerName, ServerTag};

/// Identity of a created table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TableId(Uuid);

impl TableId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Requested sharding and replication settings for one table.
///
/// `num_replicas` fixes the replica count per server tag; iteration order is
/// the tag order, which makes planning deterministic. `director_tag` names
/// the tag that contributes each shard's director and must have a non-zero
/// count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationParams {
    pub num_shards: usize,
    pub num_replicas: BTreeMap<ServerTag, usize>,
    pub director_tag: ServerTag,
}

impl ReplicationParams {
    /// Total replicas per shard across all tags.
    pub fn total_replicas(&self) -> usize {
        self.num_replicas.values().sum()
    }
}

/// Placement of one shard: its replica set and its director.
///
/// `directors` has exactly one entry in a valid configuration and the
/// director is always a member of `replicas`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardPlan {
    pub replicas: BTreeSet<ServerName>,
    pub directors: Vec<ServerName>,
}

impl ShardPlan {
    pub fn director(&self) -> Option<&ServerName> {
        self.directors.first()
    }
}

/// Concrete placement of a whole table, indexed by shard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub shards: Vec<ShardPlan>,
}

impl TableConfig {
    /// Configuration with `num_shards` empty shard plans.
    pub fn new(num_shards: usize) -> Self {
        Self {
            shards: vec![ShardPlan::default(); num_shards],
        }
    }

    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    pub fn shard(&self, index: usize) -> &ShardPlan {
        &self.shards[index]
    }
}

//! Planner failure values
//!
//! Everything the planner can reject is reported as a value with a message
//! precise enough to act on; only internal invariant violations panic.

use thiserror::Error;

use tp_core::{ServerName, ServerTag};

/// Why a table configuration could not be generated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("Every table must have at least one shard.")]
    NoShards,

    #[error("Maximum number of shards is {}.", super::validate::MAX_SHARDS)]
    TooManyShards,

    #[error(
        "Can't use server tag `{0}` for directors because you specified no \
         replicas in server tag `{0}`."
    )]
    DirectorTagUnused(ServerTag),

    #[error(
        "Server tags `{first}` and `{second}` overlap; both contain server \
         `{server}`. The server tags used for replication settings for a given \
         table must be non-overlapping."
    )]
    OverlappingTags {
        first: ServerTag,
        second: ServerTag,
        server: ServerName,
    },

    #[error(
        "You requested {requested} replicas on servers with the tag `{tag}`, \
         but there are only {available} servers with the tag `{tag}`. It's \
         impossible to have more replicas of the data than there are servers."
    )]
    NotEnoughServers {
        requested: usize,
        tag: ServerTag,
        available: usize,
    },

    #[error("Can't configure table because server `{0}` is missing")]
    ServerMissing(ServerName),

    #[error(
        "Cannot configure table because multiple servers are named `{0}`. Fix \
         this name collision and try again."
    )]
    NameCollision(ServerName),

    #[error("Table configuration was interrupted.")]
    Interrupted,
}

//! The shard/server pairing space
//!
//! A [`Pairing`] represents the possibility of using a server as a replica
//! for a shard. Pairings are judged on three keys: `self_usage_cost` (load
//! this plan has already put on the server), `backfill_cost` (how much data
//! would have to move) and `other_usage_cost` (load from other tables), in
//! that order. Prioritising self-usage spreads the table over its servers;
//! backfill cost then keeps data where it already is; other-usage breaks the
//! remaining ties across tables.
//!
//! `self_usage_cost` changes constantly while the selector runs, so it is
//! stored once per server ([`ServerPairings`]) rather than per pairing,
//! making the update cheap.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use ordered_float::OrderedFloat;

use tp_core::ServerName;

/// Candidate placement of one shard on one server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Pairing {
    /// Estimated cost of bringing the server up to date for the shard
    pub backfill_cost: OrderedFloat<f64>,
    /// Shard index; doubles as the deterministic tie-break
    pub shard: usize,
}

/// All remaining candidate pairings of a single server, with the usage
/// costs shared by every pairing on it.
#[derive(Debug, Clone)]
pub(crate) struct ServerPairings {
    pub server: ServerName,
    pub self_usage_cost: u64,
    pub other_usage_cost: u64,
    pub pairings: BTreeSet<Pairing>,
}

impl ServerPairings {
    pub(crate) fn cheapest(&self) -> Option<&Pairing> {
        self.pairings.first()
    }
}

// Equality mirrors the ordering key exactly; the non-cheapest pairings do
// not participate, keeping `eq` consistent with `cmp`.
impl PartialEq for ServerPairings {
    fn eq(&self, other: &Self) -> bool {
        (
            self.self_usage_cost,
            self.cheapest(),
            self.other_usage_cost,
            &self.server,
        ) == (
            other.self_usage_cost,
            other.cheapest(),
            other.other_usage_cost,
            &other.server,
        )
    }
}

impl Eq for ServerPairings {}

impl Ord for ServerPairings {
    fn cmp(&self, other: &Self) -> Ordering {
        // Only meaningful while both sides still have pairings; empty sets
        // are never kept in the selector's queue.
        debug_assert!(!self.pairings.is_empty());
        debug_assert!(!other.pairings.is_empty());
        self.self_usage_cost
            .cmp(&other.self_usage_cost)
            .then_with(|| self.cheapest().cmp(&other.cheapest()))
            .then_with(|| self.other_usage_cost.cmp(&other.other_usage_cost))
            .then_with(|| self.server.cmp(&other.server))
    }
}

impl PartialOrd for ServerPairings {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

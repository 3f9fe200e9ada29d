//! Greedy pairing selection
//!
//! Extracts the best remaining shard/server pairing over and over until
//! every shard has received its quota for the current phase. The priority
//! order lives on [`ServerPairings`]; because a placement changes the
//! server's ordering key, the entry is removed from the queue, updated and
//! reinserted on every round.

use std::collections::BTreeSet;

use tokio_util::sync::CancellationToken;

use tp_core::ServerName;

use super::error::PlanError;
use super::pairing::ServerPairings;
use super::yielder::CalculationYielder;

/// Place `per_shard_cap` replicas per shard, reporting each placement
/// through `place(shard, server)`.
///
/// Every placement raises the chosen server's self-usage by `usage_cost`
/// before it competes for the next slot. Callers guarantee that the
/// pairings can satisfy the quota; running dry is a logic error.
pub(crate) async fn pick_best_pairings(
    num_shards: usize,
    per_shard_cap: usize,
    mut pairings: BTreeSet<ServerPairings>,
    usage_cost: u64,
    yielder: &mut CalculationYielder,
    interruptor: &CancellationToken,
    mut place: impl FnMut(usize, &ServerName),
) -> Result<(), PlanError> {
    let mut shard_replicas = vec![0usize; num_shards];
    let mut total_placed = 0;

    while total_placed < num_shards * per_shard_cap {
        let mut sp = pairings
            .pop_first()
            .expect("pairings ran out before every shard was satisfied");
        let pairing = *sp
            .cheapest()
            .expect("empty server pairings kept in the queue");

        if shard_replicas[pairing.shard] < per_shard_cap {
            place(pairing.shard, &sp.server);
            shard_replicas[pairing.shard] += 1;
            total_placed += 1;
            sp.self_usage_cost += usage_cost;
        }

        sp.pairings.remove(&pairing);
        if !sp.pairings.is_empty() {
            pairings.insert(sp);
        }

        yielder.maybe_yield(interruptor).await?;
    }
    Ok(())
}

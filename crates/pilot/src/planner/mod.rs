//! Replica placement planning
//!
//! Turns requested replication settings into a concrete table
//! configuration: for every shard, the set of replica servers and the one
//! server acting as director. The planner balances the new table's load
//! across servers, balances against load from already-planned tables, and
//! prefers servers that already hold up-to-date data for a shard so little
//! backfilling is needed.
//!
//! The planner is a deterministic greedy algorithm, not an optimal solver;
//! it neither moves data nor persists anything.

mod cost;
mod error;
mod pairing;
mod select;
mod snapshot;
mod usage;
mod validate;
mod yielder;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use ordered_float::OrderedFloat;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tp_core::{ReplicationParams, ServerName, ShardScheme, TableConfig, TableId};

use crate::directory::{DirectoryView, NameClient};

use cost::{estimate_backfill_cost, MAX_BACKFILL_COST};
use pairing::{Pairing, ServerPairings};
use yielder::CalculationYielder;

pub use cost::CostWeighting;
pub use error::PlanError;
pub use usage::{tally_server_usage, PRIMARY_USAGE_COST, SECONDARY_USAGE_COST};

/// Table configuration planner.
///
/// Stateless apart from its cost weighting policy; one planner can serve
/// any number of `generate_config` calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Planner {
    /// How backfill cost estimates average over a shard's sub-ranges
    pub weighting: CostWeighting,
}

impl Planner {
    /// Plan replica placement for one table.
    ///
    /// `table_id` is `None` when the table does not exist yet, in which
    /// case nothing would have to be backfilled no matter where the
    /// replicas land. `server_usage` carries the load other tables already
    /// put on each server. Cancelling `interruptor` makes the call return
    /// [`PlanError::Interrupted`] at its next yield point; callers with a
    /// deadline cancel the token from a timer.
    ///
    /// The greedy assignment has a known flaw: it can distribute replicas
    /// unevenly. With three servers A, B, C, three shards, and two replicas
    /// per shard, directors are assigned one per server; the replica round
    /// then places shard 1's replica on B and shard 2's on A, but shard 3's
    /// replica cannot go to C (already its director), so one server ends up
    /// with three replicas and another with one instead of two each. This
    /// is accepted; plans are still deterministic.
    #[allow(clippy::too_many_arguments)]
    pub async fn generate_config<N: NameClient>(
        &self,
        name_client: &N,
        table_id: Option<TableId>,
        directory: &DirectoryView,
        server_usage: &HashMap<ServerName, u64>,
        params: &ReplicationParams,
        shard_scheme: &ShardScheme,
        interruptor: &CancellationToken,
    ) -> Result<TableConfig, PlanError> {
        let mut yielder = CalculationYielder::new();

        // Tag membership is copied out once; the same frozen lists feed
        // validation and placement even if the name client moves on.
        let tags = snapshot::snapshot_tags(name_client, params);

        if let Err(err) = validate::validate_params(params, &tags) {
            warn!("Rejecting table configuration request: {}", err);
            return Err(err);
        }

        let activity = match table_id {
            Some(table_id) => {
                snapshot::snapshot_activity(name_client, directory, &tags, table_id)?
            }
            // A table that doesn't exist yet has no reactors to ask.
            None => BTreeMap::new(),
        };

        yielder.maybe_yield(interruptor).await?;

        let mut config = TableConfig::new(params.num_shards);
        let total_replicas = params.total_replicas();

        for (tag, &count) in &params.num_replicas {
            if count == 0 {
                // Avoid unnecessary computation and spurious errors.
                continue;
            }

            let in_tag = &tags[tag];
            if in_tag.len() < count {
                return Err(PlanError::NotEnoughServers {
                    requested: count,
                    tag: tag.clone(),
                    available: in_tag.len(),
                });
            }

            // Desirability of every shard/server pair within the tag.
            let mut pairings: BTreeMap<ServerName, ServerPairings> = BTreeMap::new();
            for server in in_tag {
                let mut sp = ServerPairings {
                    server: server.clone(),
                    self_usage_cost: 0,
                    other_usage_cost: server_usage.get(server).copied().unwrap_or(0),
                    pairings: BTreeSet::new(),
                };
                for shard in 0..params.num_shards {
                    let backfill_cost = if table_id.is_some() {
                        match activity.get(server) {
                            Some(card) => estimate_backfill_cost(
                                card,
                                shard_scheme.shard_range(shard),
                                self.weighting,
                            ),
                            // An existing table but no advertised reactor
                            // state: assume the worst.
                            None => MAX_BACKFILL_COST,
                        }
                    } else {
                        // A new table has no data to move.
                        0.0
                    };
                    sp.pairings.insert(Pairing {
                        backfill_cost: OrderedFloat(backfill_cost),
                        shard,
                    });
                }
                pairings.insert(server.clone(), sp);
                yielder.maybe_yield(interruptor).await?;
            }

            // Directors are picked separately, before the other replicas,
            // so that they land on distinct servers whenever possible.
            if *tag == params.director_tag {
                let queue: BTreeSet<ServerPairings> = pairings
                    .values()
                    .filter(|sp| !sp.pairings.is_empty())
                    .cloned()
                    .collect();
                select::pick_best_pairings(
                    params.num_shards,
                    1, // one director per shard
                    queue,
                    PRIMARY_USAGE_COST,
                    &mut yielder,
                    interruptor,
                    |shard, server| {
                        debug!("Shard {} director -> {}", shard, server);
                        let plan = &mut config.shards[shard];
                        assert!(
                            plan.directors.is_empty(),
                            "shard {shard} was assigned two directors"
                        );
                        plan.replicas.insert(server.clone());
                        plan.directors.push(server.clone());
                        // The replica round must see the director choices:
                        // charge the server and retire the pairing so it
                        // cannot be picked again for the same shard.
                        let sp = pairings
                            .get_mut(server)
                            .expect("director chosen outside the tag");
                        sp.self_usage_cost += PRIMARY_USAGE_COST;
                        sp.pairings.retain(|p| p.shard != shard);
                    },
                )
                .await?;
            }

            // Now the remaining replicas.
            let queue: BTreeSet<ServerPairings> = pairings
                .into_values()
                .filter(|sp| !sp.pairings.is_empty())
                .collect();
            let per_shard_cap = count - usize::from(*tag == params.director_tag);
            select::pick_best_pairings(
                params.num_shards,
                per_shard_cap,
                queue,
                SECONDARY_USAGE_COST,
                &mut yielder,
                interruptor,
                |shard, server| {
                    debug!("Shard {} replica -> {}", shard, server);
                    config.shards[shard].replicas.insert(server.clone());
                },
            )
            .await?;
        }

        for (shard, plan) in config.shards.iter().enumerate() {
            assert_eq!(
                plan.replicas.len(),
                total_replicas,
                "shard {shard} ended up with the wrong number of replicas"
            );
            assert_eq!(
                plan.directors.len(),
                1,
                "shard {shard} ended up without exactly one director"
            );
        }

        info!(
            "Generated configuration: {} shards, {} replicas per shard",
            params.num_shards, total_replicas
        );
        Ok(config)
    }
}

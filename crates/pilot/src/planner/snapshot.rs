//! Point-in-time cluster snapshots
//!
//! The name client and the directory both change under the planner's feet.
//! Everything a plan needs is therefore copied out once, up front; the rest
//! of the planner works exclusively from these frozen maps so that
//! validation and placement cannot disagree about who is in the cluster.

use std::collections::{BTreeMap, BTreeSet};

use tp_core::{ReactorBusinessCard, ReplicationParams, ServerName, ServerTag, TableId};

use crate::directory::{DirectoryView, NameClient};

use super::error::PlanError;

/// Freeze the server set of every tag mentioned in `params`.
pub(crate) fn snapshot_tags<N: NameClient>(
    name_client: &N,
    params: &ReplicationParams,
) -> BTreeMap<ServerTag, BTreeSet<ServerName>> {
    let mut tags = BTreeMap::new();
    for tag in params.num_replicas.keys() {
        tags.insert(tag.clone(), name_client.servers_with_tag(tag));
    }
    tags.entry(params.director_tag.clone())
        .or_insert_with(|| name_client.servers_with_tag(&params.director_tag));
    tags
}

/// Freeze the per-table activity advertisement of every server in the tag
/// snapshot.
///
/// Fails when a server cannot be resolved to exactly one live peer: no
/// machine id, no peer id, or no directory entry for the peer means the
/// server is missing; several machine ids behind one name is a collision. A
/// reachable peer that simply has no reactor for this table yet is fine and
/// contributes no card.
pub(crate) fn snapshot_activity<N: NameClient>(
    name_client: &N,
    directory: &DirectoryView,
    tags: &BTreeMap<ServerTag, BTreeSet<ServerName>>,
    table_id: TableId,
) -> Result<BTreeMap<ServerName, ReactorBusinessCard>, PlanError> {
    let name_to_machines = name_client.name_to_machine_ids();

    let mut activity = BTreeMap::new();
    let mut missing: BTreeSet<&ServerName> = BTreeSet::new();
    let mut colliding: BTreeSet<&ServerName> = BTreeSet::new();

    directory.read_with(|peers| {
        for server in tags.values().flatten() {
            let machines = name_to_machines
                .get(server)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            if machines.len() > 1 {
                colliding.insert(server);
                continue;
            }
            let Some(&machine) = machines.first() else {
                missing.insert(server);
                continue;
            };
            let Some(peer) = name_client.peer_for_machine(machine) else {
                missing.insert(server);
                continue;
            };
            let Some(peer_dir) = peers.get(&peer) else {
                missing.insert(server);
                continue;
            };
            if let Some(card) = peer_dir.tables.get(&table_id) {
                activity.insert(server.clone(), card.clone());
            }
        }
    });

    if let Some(&server) = missing.first() {
        return Err(PlanError::ServerMissing(server.clone()));
    }
    if let Some(&server) = colliding.first() {
        return Err(PlanError::NameCollision(server.clone()));
    }
    Ok(activity)
}

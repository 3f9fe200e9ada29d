// common/mod.rs

use std::collections::{BTreeMap, BTreeSet, HashMap};

use pilot::directory::{DirectoryView, NameClient, PerPeerDirectory};
use tp_core::{
    KeyRange, MachineId, PeerId, ReactorActivity, ReactorBusinessCard, ReplicationParams,
    ServerName, ServerTag, TableConfig, TableId,
};

/// In-memory name service and directory backing planner tests.
pub struct TestCluster {
    tags: BTreeMap<ServerTag, BTreeSet<ServerName>>,
    machines: BTreeMap<ServerName, Vec<MachineId>>,
    peers: BTreeMap<MachineId, PeerId>,
    server_peers: BTreeMap<ServerName, PeerId>,
    dirs: HashMap<PeerId, PerPeerDirectory>,
    pub directory: DirectoryView,
}

impl TestCluster {
    pub fn new() -> Self {
        Self {
            tags: BTreeMap::new(),
            machines: BTreeMap::new(),
            peers: BTreeMap::new(),
            server_peers: BTreeMap::new(),
            dirs: HashMap::new(),
            directory: DirectoryView::new(),
        }
    }

    /// Fully connected server: name, machine, peer and a directory entry.
    pub fn add_server(&mut self, name: &str, tags: &[&str]) -> ServerName {
        let server = self.add_ghost_server(name, tags);
        let machine = MachineId::random();
        let peer = PeerId::random();
        self.machines.insert(server.clone(), vec![machine]);
        self.peers.insert(machine, peer);
        self.server_peers.insert(server.clone(), peer);
        self.dirs.insert(peer, PerPeerDirectory::default());
        self.directory.set_peer(peer, PerPeerDirectory::default());
        server
    }

    /// Server that carries tags but cannot be resolved to a live peer.
    pub fn add_ghost_server(&mut self, name: &str, tags: &[&str]) -> ServerName {
        let server = ServerName::from(name);
        for tag in tags {
            self.tags
                .entry(ServerTag::from(*tag))
                .or_default()
                .insert(server.clone());
        }
        server
    }

    /// Server whose name resolves to two machines at once.
    pub fn add_colliding_server(&mut self, name: &str, tags: &[&str]) -> ServerName {
        let server = self.add_ghost_server(name, tags);
        self.machines
            .insert(server.clone(), vec![MachineId::random(), MachineId::random()]);
        server
    }

    /// Advertise reactor activities for `server` over `table`.
    pub fn set_activity(
        &mut self,
        server: &ServerName,
        table: TableId,
        entries: &[(KeyRange, ReactorActivity)],
    ) {
        let peer = self.server_peers[server];
        let card = ReactorBusinessCard::new(
            entries
                .iter()
                .map(|&(region, activity)| tp_core::ActivityEntry::new(region, activity))
                .collect(),
        );
        let dir = self.dirs.get_mut(&peer).unwrap();
        dir.insert(table, card);
        self.directory.set_peer(peer, dir.clone());
    }

    fn tag_members(&self, tag: &ServerTag) -> BTreeSet<ServerName> {
        self.tags.get(tag).cloned().unwrap_or_default()
    }
}

impl NameClient for TestCluster {
    fn servers_with_tag(&self, tag: &ServerTag) -> BTreeSet<ServerName> {
        self.tag_members(tag)
    }

    fn name_to_machine_ids(&self) -> BTreeMap<ServerName, Vec<MachineId>> {
        self.machines.clone()
    }

    fn peer_for_machine(&self, machine: MachineId) -> Option<PeerId> {
        self.peers.get(&machine).copied()
    }
}

pub fn params(
    num_shards: usize,
    replicas: &[(&str, usize)],
    director: &str,
) -> ReplicationParams {
    ReplicationParams {
        num_shards,
        num_replicas: replicas
            .iter()
            .map(|(tag, count)| (ServerTag::from(*tag), *count))
            .collect(),
        director_tag: ServerTag::from(director),
    }
}

/// Check the structural invariants every successful plan must satisfy.
pub fn assert_valid_config(
    config: &TableConfig,
    params: &ReplicationParams,
    cluster: &TestCluster,
) {
    assert_eq!(config.num_shards(), params.num_shards, "wrong shard count");

    let replicated_tags: Vec<(&ServerTag, usize)> = params
        .num_replicas
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(tag, count)| (tag, *count))
        .collect();

    for (index, shard) in config.shards.iter().enumerate() {
        assert_eq!(shard.directors.len(), 1, "shard {index} director count");
        let director = shard.director().unwrap();
        assert!(
            shard.replicas.contains(director),
            "shard {index} director is not a replica"
        );
        assert_eq!(
            shard.replicas.len(),
            params.total_replicas(),
            "shard {index} replica count"
        );
        for replica in &shard.replicas {
            assert!(
                replicated_tags
                    .iter()
                    .any(|&(tag, _)| cluster.tag_members(tag).contains(replica)),
                "shard {index} replica {replica} is outside every replicated tag"
            );
        }
    }

    // Per tag, the table draws exactly num_shards * count replicas.
    for (tag, count) in replicated_tags {
        let members = cluster.tag_members(tag);
        let drawn: usize = config
            .shards
            .iter()
            .map(|shard| shard.replicas.iter().filter(|r| members.contains(*r)).count())
            .sum();
        assert_eq!(
            drawn,
            params.num_shards * count,
            "tag {tag} contributed the wrong number of replicas"
        );
    }
}

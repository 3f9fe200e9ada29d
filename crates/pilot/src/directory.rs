//! Cluster directory access
//!
//! The planner reads two things from the rest of the cluster: which servers
//! carry which tag (through a [`NameClient`]) and what every connected
//! peer's reactors are currently doing (through a [`DirectoryView`]). Both
//! are fed by gossip elsewhere in the control plane; the planner only ever
//! reads them.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use tp_core::{MachineId, PeerId, ReactorBusinessCard, ServerName, ServerTag, TableId};

/// Name service queries used during planning.
///
/// Answers may change between calls as servers join, leave or get renamed;
/// callers that need a consistent view must copy the answers once and work
/// from the copy.
pub trait NameClient {
    /// Servers currently carrying `tag`.
    fn servers_with_tag(&self, tag: &ServerTag) -> BTreeSet<ServerName>;

    /// Name to machine id multimap. A name mapping to more than one machine
    /// is a collision that the caller has to handle.
    fn name_to_machine_ids(&self) -> BTreeMap<ServerName, Vec<MachineId>>;

    /// Peer a machine is currently connected as, `None` while disconnected.
    fn peer_for_machine(&self, machine: MachineId) -> Option<PeerId>;
}

/// Everything one peer advertises about its tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerPeerDirectory {
    /// Business card per table hosted by the peer
    pub tables: HashMap<TableId, ReactorBusinessCard>,
}

impl PerPeerDirectory {
    pub fn insert(&mut self, table: TableId, card: ReactorBusinessCard) {
        self.tables.insert(table, card);
    }
}

/// Shared view of the cluster directory, keyed by peer.
///
/// Mutated by the gossip layer whenever a peer's advertisement changes;
/// readers get a closure over the whole map so one visit observes a single
/// consistent state.
#[derive(Debug, Clone, Default)]
pub struct DirectoryView {
    inner: Arc<RwLock<HashMap<PeerId, PerPeerDirectory>>>,
}

impl DirectoryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visit the directory map read-only.
    pub fn read_with<R>(&self, visit: impl FnOnce(&HashMap<PeerId, PerPeerDirectory>) -> R) -> R {
        visit(&self.inner.read())
    }

    /// Replace one peer's advertisement.
    pub fn set_peer(&self, peer: PeerId, dir: PerPeerDirectory) {
        self.inner.write().insert(peer, dir);
    }

    /// Drop a disconnected peer.
    pub fn remove_peer(&self, peer: &PeerId) {
        self.inner.write().remove(peer);
    }
}

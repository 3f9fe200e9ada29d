//! Per-server usage accounting
//!
//! Being primary for a shard usually costs more than being secondary, so
//! the two roles are weighted differently when assigning replicas. The
//! concrete values don't matter, only their ratio, but they are fixed so
//! plans stay reproducible.

use std::collections::HashMap;

use tp_core::{ServerName, TableConfig};

/// Load attributed to serving as a shard's director.
pub const PRIMARY_USAGE_COST: u64 = 10;
/// Load attributed to holding a secondary replica of a shard.
pub const SECONDARY_USAGE_COST: u64 = 8;

/// Add an existing table's load contribution into a per-server usage map.
///
/// Callers planning several tables run every already-planned configuration
/// through this to build the `server_usage` input for the next plan.
pub fn tally_server_usage(config: &TableConfig, usage: &mut HashMap<ServerName, u64>) {
    for shard in &config.shards {
        for server in &shard.replicas {
            *usage.entry(server.clone()).or_default() += SECONDARY_USAGE_COST;
        }
        if let Some(director) = shard.director() {
            *usage.entry(director.clone()).or_default() +=
                PRIMARY_USAGE_COST - SECONDARY_USAGE_COST;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tp_core::ShardPlan;

    #[test]
    fn test_director_costs_more_than_secondary() {
        let a = ServerName::from("a");
        let b = ServerName::from("b");
        let config = TableConfig {
            shards: vec![ShardPlan {
                replicas: BTreeSet::from([a.clone(), b.clone()]),
                directors: vec![a.clone()],
            }],
        };

        let mut usage = HashMap::new();
        tally_server_usage(&config, &mut usage);
        assert_eq!(usage[&a], PRIMARY_USAGE_COST);
        assert_eq!(usage[&b], SECONDARY_USAGE_COST);
    }

    #[test]
    fn test_usage_accumulates_across_tables() {
        let a = ServerName::from("a");
        let config = TableConfig {
            shards: vec![ShardPlan {
                replicas: BTreeSet::from([a.clone()]),
                directors: vec![a.clone()],
            }],
        };

        let mut usage = HashMap::new();
        tally_server_usage(&config, &mut usage);
        tally_server_usage(&config, &mut usage);
        assert_eq!(usage[&a], 2 * PRIMARY_USAGE_COST);
    }
}

//! Replication parameter validation
//!
//! Runs against the tag snapshot taken for the current call, never against
//! live name-client state, so validation and placement see identical
//! inputs.

use std::collections::{BTreeMap, BTreeSet};

use tp_core::{ReplicationParams, ServerName, ServerTag};

use super::error::PlanError;

/// Hard upper bound on shards per table.
pub(crate) const MAX_SHARDS: usize = 32;

/// Check that `params` are legal against the snapshotted tag membership.
pub(crate) fn validate_params(
    params: &ReplicationParams,
    servers_with_tags: &BTreeMap<ServerTag, BTreeSet<ServerName>>,
) -> Result<(), PlanError> {
    if params.num_shards == 0 {
        return Err(PlanError::NoShards);
    }
    if params.num_shards > MAX_SHARDS {
        return Err(PlanError::TooManyShards);
    }
    match params.num_replicas.get(&params.director_tag) {
        None | Some(0) => {
            return Err(PlanError::DirectorTagUnused(params.director_tag.clone()));
        }
        Some(_) => {}
    }

    // Tags with a non-zero count must partition the servers they cover.
    let mut claimed: BTreeMap<&ServerName, &ServerTag> = BTreeMap::new();
    for (tag, count) in &params.num_replicas {
        if *count == 0 {
            continue;
        }
        for server in servers_with_tags.get(tag).into_iter().flatten() {
            if let Some(previous) = claimed.insert(server, tag) {
                return Err(PlanError::OverlappingTags {
                    first: tag.clone(),
                    second: previous.clone(),
                    server: server.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_map(entries: &[(&str, &[&str])]) -> BTreeMap<ServerTag, BTreeSet<ServerName>> {
        entries
            .iter()
            .map(|(tag, servers)| {
                (
                    ServerTag::from(*tag),
                    servers.iter().map(|s| ServerName::from(*s)).collect(),
                )
            })
            .collect()
    }

    fn params(num_shards: usize, replicas: &[(&str, usize)], director: &str) -> ReplicationParams {
        ReplicationParams {
            num_shards,
            num_replicas: replicas
                .iter()
                .map(|(tag, count)| (ServerTag::from(*tag), *count))
                .collect(),
            director_tag: ServerTag::from(director),
        }
    }

    #[test]
    fn test_accepts_well_formed_params() {
        let tags = tag_map(&[("default", &["a", "b", "c"])]);
        validate_params(&params(4, &[("default", 2)], "default"), &tags).unwrap();
    }

    #[test]
    fn test_rejects_zero_shards() {
        let tags = tag_map(&[("default", &["a"])]);
        assert_eq!(
            validate_params(&params(0, &[("default", 1)], "default"), &tags),
            Err(PlanError::NoShards)
        );
    }

    #[test]
    fn test_rejects_too_many_shards() {
        let tags = tag_map(&[("default", &["a"])]);
        assert_eq!(
            validate_params(&params(33, &[("default", 1)], "default"), &tags),
            Err(PlanError::TooManyShards)
        );
        // The boundary itself is accepted.
        validate_params(&params(32, &[("default", 1)], "default"), &tags).unwrap();
    }

    #[test]
    fn test_rejects_absent_director_tag() {
        let tags = tag_map(&[("default", &["a"])]);
        assert_eq!(
            validate_params(&params(1, &[("default", 1)], "vip"), &tags),
            Err(PlanError::DirectorTagUnused(ServerTag::from("vip")))
        );
    }

    #[test]
    fn test_rejects_zero_count_director_tag() {
        let tags = tag_map(&[("default", &["a"]), ("vip", &["b"])]);
        assert_eq!(
            validate_params(&params(1, &[("default", 1), ("vip", 0)], "vip"), &tags),
            Err(PlanError::DirectorTagUnused(ServerTag::from("vip")))
        );
    }

    #[test]
    fn test_rejects_overlapping_tags() {
        let tags = tag_map(&[("t1", &["x", "y"]), ("t2", &["x", "z"])]);
        let err =
            validate_params(&params(1, &[("t1", 1), ("t2", 1)], "t1"), &tags).unwrap_err();
        match err {
            PlanError::OverlappingTags { server, .. } => {
                assert_eq!(server, ServerName::from("x"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_zero_count_tags_may_overlap() {
        // A tag nobody replicates onto doesn't claim its servers.
        let tags = tag_map(&[("default", &["a", "b"]), ("spare", &["a"])]);
        validate_params(
            &params(2, &[("default", 1), ("spare", 0)], "default"),
            &tags,
        )
        .unwrap();
    }
}

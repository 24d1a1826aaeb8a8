//! Point-in-time view of registry groups, cluster links, and directory
//! state.  All planning decisions are made against one snapshot so a
//! run never mixes observations from different moments.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use regsync_client::ClientError;
use regsync_registry::{
    identifier_of_type, Identifier, IdentifierType, RegistryAccessor, RegistryError,
};
use tracing::{debug, info, warn};

use crate::error::EngineResult;

/// `ospoolproject` values beginning with `Yes-` mark a group as a
/// project that the engine manages.
static PROJECT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Yes-").expect("static regex"));

/// One registry group together with its identifiers.
#[derive(Debug, Clone)]
pub struct GroupRecord {
    pub gid: i64,
    pub name: String,
    pub description: String,
    pub identifiers: Vec<Identifier>,
}

impl GroupRecord {
    /// Whether this group is a managed project (`ospoolproject` marker
    /// present and affirmative).
    #[must_use]
    pub fn is_project(&self) -> bool {
        self.identifiers
            .iter()
            .filter(|i| i.kind == IdentifierType::OspoolProject)
            .any(|i| PROJECT_MARKER.is_match(&i.value))
    }

    /// The group's unix GID, when exactly derivable.
    #[must_use]
    pub fn osggid(&self) -> Option<i64> {
        identifier_of_type(&self.identifiers, &IdentifierType::OsgGid)
            .and_then(Identifier::numeric_value)
    }

    /// Number of `osggid` identifiers attached; more than one means the
    /// group needs fixup, not allocation.
    #[must_use]
    pub fn osggid_count(&self) -> usize {
        self.identifiers
            .iter()
            .filter(|i| i.kind == IdentifierType::OsgGid)
            .count()
    }
}

/// Consistent view captured at the start of a run.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Groups ordered by gid so every pass over the snapshot is
    /// deterministic.
    pub groups: Vec<GroupRecord>,
    /// Group ids already linked into the unix cluster.
    pub cluster_group_ids: BTreeSet<i64>,
    /// GIDs currently present in the directory.
    pub directory_gids: BTreeSet<i64>,
    /// Highest `osggid` observed across all groups, or 0 when none.
    pub highest_osggid: i64,
    /// Groups skipped because their identifier payload would not decode.
    pub skipped_groups: Vec<i64>,
}

impl Snapshot {
    /// Capture registry groups and cluster links, folding in the
    /// directory GIDs the caller already read.
    pub async fn capture(
        accessor: &RegistryAccessor,
        co_id: i64,
        cluster_id: i64,
        directory_gids: BTreeSet<i64>,
    ) -> EngineResult<Self> {
        let mut snapshot = Snapshot {
            directory_gids,
            ..Snapshot::default()
        };

        for group in accessor.groups(co_id).await? {
            let identifiers = match accessor.group_identifiers(group.id).await {
                Ok(identifiers) => identifiers,
                Err(RegistryError::Client(ClientError::Decode { .. })) => {
                    warn!(gid = group.id, name = %group.name,
                        "skipping group with undecodable identifiers");
                    snapshot.skipped_groups.push(group.id);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            snapshot.groups.push(GroupRecord {
                gid: group.id,
                name: group.name,
                description: group.description,
                identifiers,
            });
        }
        snapshot.groups.sort_by_key(|g| g.gid);

        snapshot.highest_osggid = snapshot
            .groups
            .iter()
            .filter_map(GroupRecord::osggid)
            .max()
            .unwrap_or(0);

        snapshot.cluster_group_ids = accessor.cluster_group_ids(cluster_id).await?;

        info!(
            groups = snapshot.groups.len(),
            cluster_links = snapshot.cluster_group_ids.len(),
            directory_gids = snapshot.directory_gids.len(),
            highest_osggid = snapshot.highest_osggid,
            skipped = snapshot.skipped_groups.len(),
            "snapshot captured"
        );
        debug!(skipped = ?snapshot.skipped_groups, "snapshot skip list");
        Ok(snapshot)
    }

    /// Iterator over just the managed projects.
    pub fn projects(&self) -> impl Iterator<Item = &GroupRecord> {
        self.groups.iter().filter(|g| g.is_project())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(id: i64, kind: IdentifierType, value: &str) -> Identifier {
        Identifier {
            id,
            kind,
            value: value.to_string(),
            status: "Active".to_string(),
        }
    }

    fn group(gid: i64, identifiers: Vec<Identifier>) -> GroupRecord {
        GroupRecord {
            gid,
            name: format!("group{gid}"),
            description: String::new(),
            identifiers,
        }
    }

    #[test]
    fn project_marker_requires_yes_prefix() {
        let yes = group(1, vec![ident(10, IdentifierType::OspoolProject, "Yes-proj1")]);
        let no = group(2, vec![ident(11, IdentifierType::OspoolProject, "No")]);
        let none = group(3, vec![]);
        assert!(yes.is_project());
        assert!(!no.is_project());
        assert!(!none.is_project());
    }

    #[test]
    fn osggid_requires_numeric_value() {
        let numeric = group(1, vec![ident(10, IdentifierType::OsgGid, "200000")]);
        let junk = group(2, vec![ident(11, IdentifierType::OsgGid, "abc")]);
        assert_eq!(numeric.osggid(), Some(200_000));
        assert_eq!(junk.osggid(), None);
        assert_eq!(junk.osggid_count(), 1);
    }

    #[test]
    fn highest_osggid_defaults_to_zero() {
        let snapshot = Snapshot::default();
        assert_eq!(snapshot.highest_osggid, 0);
    }
}

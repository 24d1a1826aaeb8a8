//! Pure set algebra over a snapshot: which projects need identifiers,
//! cluster links, and provisioning.  No I/O happens here, so planning
//! is trivially repeatable and testable.

use std::collections::BTreeSet;

use tracing::info;

use crate::snapshot::Snapshot;

/// The work a reconcile run will attempt, derived from one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Projects with no `osggid` at all.
    pub need_identifiers: BTreeSet<i64>,
    /// Projects not yet linked into the unix cluster.
    pub need_cluster_links: BTreeSet<i64>,
    /// Projects whose GID is absent from the directory (including those
    /// that have no GID yet).
    pub need_provisioning: BTreeSet<i64>,
    /// Projects carrying more than one `osggid`; excluded from
    /// allocation and left for fixup.  They still participate in the
    /// cluster-link and provisioning sets.
    pub duplicate_osggid_gids: Vec<i64>,
}

impl Plan {
    /// Derive the plan from a snapshot.  Computing twice against the
    /// same snapshot yields the same plan.
    #[must_use]
    pub fn compute(snapshot: &Snapshot) -> Self {
        let mut plan = Plan::default();

        for project in snapshot.projects() {
            match project.osggid_count() {
                0 => {
                    plan.need_identifiers.insert(project.gid);
                }
                1 => {}
                _ => {
                    plan.duplicate_osggid_gids.push(project.gid);
                }
            }
            if !snapshot.cluster_group_ids.contains(&project.gid) {
                plan.need_cluster_links.insert(project.gid);
            }
            let in_directory = project
                .osggid()
                .is_some_and(|gid| snapshot.directory_gids.contains(&gid));
            if !in_directory {
                plan.need_provisioning.insert(project.gid);
            }
        }

        info!(
            need_identifiers = plan.need_identifiers.len(),
            need_cluster_links = plan.need_cluster_links.len(),
            need_provisioning = plan.need_provisioning.len(),
            duplicates = plan.duplicate_osggid_gids.len(),
            "plan computed"
        );
        plan
    }

    /// Nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.need_identifiers.is_empty()
            && self.need_cluster_links.is_empty()
            && self.need_provisioning.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::GroupRecord;
    use regsync_registry::{Identifier, IdentifierType};

    fn ident(id: i64, kind: IdentifierType, value: &str) -> Identifier {
        Identifier {
            id,
            kind,
            value: value.to_string(),
            status: "Active".to_string(),
        }
    }

    fn project(gid: i64, extra: Vec<Identifier>) -> GroupRecord {
        let mut identifiers = vec![ident(gid * 100, IdentifierType::OspoolProject, "Yes-p")];
        identifiers.extend(extra);
        GroupRecord {
            gid,
            name: format!("p{gid}"),
            description: String::new(),
            identifiers,
        }
    }

    #[test]
    fn fresh_project_lands_in_all_three_sets() {
        let snapshot = Snapshot {
            groups: vec![project(42, vec![])],
            ..Snapshot::default()
        };
        let plan = Plan::compute(&snapshot);
        assert!(plan.need_identifiers.contains(&42));
        assert!(plan.need_cluster_links.contains(&42));
        assert!(plan.need_provisioning.contains(&42));
        assert!(plan.duplicate_osggid_gids.is_empty());
    }

    #[test]
    fn fully_reconciled_project_needs_nothing() {
        let snapshot = Snapshot {
            groups: vec![project(7, vec![ident(1, IdentifierType::OsgGid, "200001")])],
            cluster_group_ids: [7].into(),
            directory_gids: [200_001].into(),
            ..Snapshot::default()
        };
        assert!(Plan::compute(&snapshot).is_empty());
    }

    #[test]
    fn non_projects_are_ignored() {
        let snapshot = Snapshot {
            groups: vec![GroupRecord {
                gid: 9,
                name: "plain".to_string(),
                description: String::new(),
                identifiers: vec![],
            }],
            ..Snapshot::default()
        };
        assert!(Plan::compute(&snapshot).is_empty());
    }

    #[test]
    fn duplicate_osggid_skips_allocation_only() {
        // No cluster link and nothing in the directory: the duplicate
        // still gets a link and provisioning scheduled.
        let snapshot = Snapshot {
            groups: vec![project(
                5,
                vec![
                    ident(1, IdentifierType::OsgGid, "100"),
                    ident(2, IdentifierType::OsgGid, "105"),
                ],
            )],
            ..Snapshot::default()
        };
        let plan = Plan::compute(&snapshot);
        assert_eq!(plan.duplicate_osggid_gids, vec![5]);
        assert!(plan.need_identifiers.is_empty());
        assert!(plan.need_cluster_links.contains(&5));
        assert!(plan.need_provisioning.contains(&5));
    }

    #[test]
    fn duplicate_osggid_already_linked_and_provisioned_needs_nothing() {
        let snapshot = Snapshot {
            groups: vec![project(
                5,
                vec![
                    ident(1, IdentifierType::OsgGid, "100"),
                    ident(2, IdentifierType::OsgGid, "105"),
                ],
            )],
            cluster_group_ids: [5].into(),
            directory_gids: [100].into(),
            ..Snapshot::default()
        };
        let plan = Plan::compute(&snapshot);
        assert_eq!(plan.duplicate_osggid_gids, vec![5]);
        assert!(plan.need_cluster_links.is_empty());
        assert!(plan.need_provisioning.is_empty());
    }

    #[test]
    fn gid_missing_from_directory_needs_provisioning() {
        let snapshot = Snapshot {
            groups: vec![project(3, vec![ident(1, IdentifierType::OsgGid, "200005")])],
            cluster_group_ids: [3].into(),
            directory_gids: [200_001].into(),
            ..Snapshot::default()
        };
        let plan = Plan::compute(&snapshot);
        assert_eq!(plan.need_provisioning, [3].into());
        assert!(plan.need_identifiers.is_empty());
    }

    #[test]
    fn plan_is_idempotent_over_a_snapshot() {
        let snapshot = Snapshot {
            groups: vec![project(42, vec![]), project(7, vec![])],
            cluster_group_ids: [7].into(),
            ..Snapshot::default()
        };
        assert_eq!(Plan::compute(&snapshot), Plan::compute(&snapshot));
    }
}

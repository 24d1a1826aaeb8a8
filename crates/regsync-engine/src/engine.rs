//! Run orchestration: snapshot, plan, apply, and the repair and
//! usermap entry points built on the same accessor.

use std::collections::BTreeSet;

use regsync_registry::{
    identifier_of_type, identifier_value, IdentifierType, RegistryAccessor,
};
use tracing::{info, warn};

use crate::error::EngineResult;
use crate::executor::{self, ApplyReport};
use crate::fixup::{
    fixed_group_name, identifiers_to_delete, is_fixup_candidate, is_misnamed, FixupBatchReport,
    FixupReport, GroupInspection,
};
use crate::planner::Plan;
use crate::snapshot::Snapshot;
use crate::usermap::{Usermap, UsermapOptions};

/// Deployment-fixed parameters of a reconcile run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Registry organization id whose groups are managed.
    pub co_id: i64,
    /// Unix cluster the managed groups are linked into.
    pub cluster_id: i64,
    /// Provisioning target that pushes to the directory.
    pub provision_target_id: i64,
    /// Smallest GID the allocator may hand out.
    pub gid_floor: i64,
}

impl EngineConfig {
    pub const DEFAULT_GID_FLOOR: i64 = 200_000;
}

/// Everything a reconcile run observed and changed.
#[derive(Debug)]
pub struct RunSummary {
    pub groups_seen: usize,
    pub projects_seen: usize,
    pub highest_osggid: i64,
    pub skipped_groups: Vec<i64>,
    pub plan: Plan,
    pub report: ApplyReport,
}

/// The reconciliation engine.  All registry traffic goes through one
/// accessor; runs are strictly sequential.
pub struct Engine {
    accessor: RegistryAccessor,
    config: EngineConfig,
}

impl Engine {
    pub fn new(accessor: RegistryAccessor, config: EngineConfig) -> Self {
        Self { accessor, config }
    }

    pub fn accessor(&self) -> &RegistryAccessor {
        &self.accessor
    }

    /// One full reconcile pass: capture a snapshot, derive the plan,
    /// apply it.  `directory_gids` is the set of GIDs currently visible
    /// in the directory.
    pub async fn reconcile(&self, directory_gids: BTreeSet<i64>) -> EngineResult<RunSummary> {
        let snapshot = Snapshot::capture(
            &self.accessor,
            self.config.co_id,
            self.config.cluster_id,
            directory_gids,
        )
        .await?;
        let plan = Plan::compute(&snapshot);
        for &gid in &plan.duplicate_osggid_gids {
            warn!(gid, "group has duplicate osggid identifiers, run fixup");
        }
        let report = executor::apply(&self.accessor, &self.config, &snapshot, &plan).await?;
        Ok(RunSummary {
            groups_seen: snapshot.groups.len(),
            projects_seen: snapshot.projects().count(),
            highest_osggid: snapshot.highest_osggid,
            skipped_groups: snapshot.skipped_groups,
            plan,
            report,
        })
    }

    /// Repair one group: fix its name, drop duplicate and legacy
    /// identifiers, then re-provision the group and its members.  The
    /// provisioning push happens even when nothing needed repairing.
    pub async fn fixup_group(&self, gid: i64) -> EngineResult<FixupReport> {
        let group = self.accessor.group(gid).await?;
        let mut report = FixupReport {
            gid,
            ..FixupReport::default()
        };

        let fixed = fixed_group_name(&group.name);
        if fixed != group.name {
            self.accessor.rename_group(&group, fixed).await?;
            report.renamed = Some((group.name.clone(), fixed.to_string()));
        }

        let identifiers = self.accessor.group_identifiers(gid).await?;
        for id in identifiers_to_delete(&identifiers) {
            self.accessor.delete_identifier(id).await?;
            report.deleted_identifiers.push(id);
        }

        self.accessor
            .provision_group(gid, self.config.provision_target_id)
            .await?;
        report.provisioned_members = self
            .accessor
            .provision_group_members(gid, self.config.provision_target_id)
            .await?;
        info!(
            gid,
            renamed = report.renamed.is_some(),
            deleted = report.deleted_identifiers.len(),
            members = report.provisioned_members.len(),
            "group repaired and reprovisioned"
        );
        Ok(report)
    }

    /// Repair every misnamed group.  One group failing does not stop
    /// the sweep.
    pub async fn fixup_all(&self) -> EngineResult<FixupBatchReport> {
        let mut batch = FixupBatchReport::default();
        for group in self.misnamed_groups().await? {
            match self.fixup_group(group).await {
                Ok(report) => batch.completed.push(report),
                Err(err) => {
                    warn!(gid = group, %err, "fixup failed, continuing");
                    batch.failed.push((group, err.to_string()));
                }
            }
        }
        info!(
            completed = batch.completed.len(),
            failed = batch.failed.len(),
            "fixup sweep finished"
        );
        Ok(batch)
    }

    /// Read-only report of what fixup would change, for every
    /// candidate group.
    pub async fn inspect(&self) -> EngineResult<Vec<GroupInspection>> {
        let mut inspections = Vec::new();
        for gid in self.candidate_groups().await? {
            let group = self.accessor.group(gid).await?;
            let identifiers = self.accessor.group_identifiers(gid).await?;
            let doomed = identifiers_to_delete(&identifiers);
            inspections.push(GroupInspection {
                gid,
                fixed_name: fixed_group_name(&group.name).to_string(),
                name: group.name,
                identifiers,
                doomed_identifiers: doomed,
            });
        }
        Ok(inspections)
    }

    async fn candidate_groups(&self) -> EngineResult<Vec<i64>> {
        let mut candidates: Vec<i64> = self
            .accessor
            .groups(self.config.co_id)
            .await?
            .into_iter()
            .filter(|g| is_fixup_candidate(&g.name, &g.description))
            .map(|g| g.id)
            .collect();
        candidates.sort_unstable();
        Ok(candidates)
    }

    /// Groups whose name still carries the mangled suffix.  The repair
    /// sweep uses this narrower set so clean autogroups are not
    /// reprovisioned on every pass.
    async fn misnamed_groups(&self) -> EngineResult<Vec<i64>> {
        let mut misnamed: Vec<i64> = self
            .accessor
            .groups(self.config.co_id)
            .await?
            .into_iter()
            .filter(|g| is_misnamed(&g.name))
            .map(|g| g.id)
            .collect();
        misnamed.sort_unstable();
        Ok(misnamed)
    }

    /// Build the project/user map.  A `filter_group` option restricts
    /// the map to users who are members of that registry group (an
    /// unknown name is a [`regsync_registry::RegistryError::NotFound`]);
    /// local override maps are merged on top afterwards.
    pub async fn usermap(&self, options: &UsermapOptions) -> EngineResult<Usermap> {
        let mut map = match options.cache.as_ref().and_then(|c| c.load()) {
            Some(cached) => Usermap::from_cache_map(&cached),
            None => {
                let built = self.usermap_from_registry().await?;
                if let Some(cache) = &options.cache {
                    cache.store(&built.to_cache_map())?;
                }
                built
            }
        };

        if let Some(group) = &options.filter_group {
            let allowed = self.group_member_users(group).await?;
            map.retain_users(&allowed);
        }
        for path in &options.local_maps {
            let text = std::fs::read_to_string(path)?;
            map.merge(Usermap::parse_local_map(&text));
        }
        info!(users = map.len(), "usermap built");
        Ok(map)
    }

    /// Any group carrying an `ospoolproject` identifier counts,
    /// whatever the marker's value; users map to the group's name.
    async fn usermap_from_registry(&self) -> EngineResult<Usermap> {
        let mut map = Usermap::default();
        for group in self.accessor.groups(self.config.co_id).await? {
            let identifiers = self.accessor.group_identifiers(group.id).await?;
            if identifier_of_type(&identifiers, &IdentifierType::OspoolProject).is_none() {
                continue;
            }
            for member in self.accessor.group_members(group.id).await? {
                if !member.member || member.person.kind != "CO" {
                    continue;
                }
                let person = self.accessor.person_identifiers(member.person.id).await?;
                if let Some(user) = identifier_value(&person, &IdentifierType::OsgUser) {
                    map.add(user, group.name.clone());
                }
            }
        }
        Ok(map)
    }

    /// Logins of the current `CO` members of a named group.
    async fn group_member_users(&self, name: &str) -> EngineResult<BTreeSet<String>> {
        let group = self.accessor.group_by_name(self.config.co_id, name).await?;
        let mut users = BTreeSet::new();
        for member in self.accessor.group_members(group.id).await? {
            if !member.member || member.person.kind != "CO" {
                continue;
            }
            let person = self.accessor.person_identifiers(member.person.id).await?;
            if let Some(user) = identifier_value(&person, &IdentifierType::OsgUser) {
                users.insert(user.to_string());
            }
        }
        Ok(users)
    }

    /// Mark an existing group as a managed project by name.  Returns
    /// the group id.
    pub async fn create_project(&self, name: &str) -> EngineResult<i64> {
        let group = self.accessor.group_by_name(self.config.co_id, name).await?;
        let identifiers = self.accessor.group_identifiers(group.id).await?;
        if identifier_value(&identifiers, &IdentifierType::OspoolProject).is_some() {
            info!(gid = group.id, name, "group already marked as a project");
            return Ok(group.id);
        }
        self.accessor.add_project_identifier(group.id, name).await?;
        info!(gid = group.id, name, "marked group as a project");
        Ok(group.id)
    }
}

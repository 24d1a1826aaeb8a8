//! Applies a plan against the registry, one write at a time.
//!
//! Writes are ordered by group id so reruns touch groups in the same
//! order.  Every identifier write is preceded by a fresh read of the
//! group's identifiers, so work another actor completed since the
//! snapshot is skipped rather than duplicated.

use regsync_client::ClientError;
use regsync_registry::{
    identifier_of_type, IdentifierType, RegistryAccessor, RegistryError,
};
use tracing::{info, warn};

use crate::allocator::GidAllocator;
use crate::engine::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::planner::Plan;
use crate::snapshot::Snapshot;

/// What a run actually changed.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// `(group id, allocated osggid)` pairs.
    pub identifiers_added: Vec<(i64, i64)>,
    /// Groups that received an `osggroup` companion identifier.
    pub companions_added: Vec<i64>,
    /// Groups newly linked into the unix cluster.
    pub links_created: Vec<i64>,
    /// Groups pushed to the provisioner.
    pub groups_provisioned: Vec<i64>,
    /// Planned groups skipped because another actor got there first.
    pub skipped: Vec<i64>,
    /// `(group id, error)` for writes that failed; the run continued.
    pub failures: Vec<(i64, String)>,
}

impl ApplyReport {
    fn record_failure(&mut self, gid: i64, err: RegistryError) -> EngineResult<()> {
        // Protocol rejections abort the run; everything else is
        // recorded and the batch continues.
        if matches!(
            err,
            RegistryError::Client(ClientError::Protocol { .. })
        ) {
            return Err(EngineError::Registry(err));
        }
        warn!(gid, %err, "write failed, continuing with remaining groups");
        self.failures.push((gid, err.to_string()));
        Ok(())
    }
}

pub(crate) async fn apply(
    accessor: &RegistryAccessor,
    config: &EngineConfig,
    snapshot: &Snapshot,
    plan: &Plan,
) -> EngineResult<ApplyReport> {
    let mut report = ApplyReport::default();
    let mut allocator = GidAllocator::new(snapshot.highest_osggid, config.gid_floor);

    for &gid in &plan.need_identifiers {
        match assign_identifiers(accessor, snapshot, &mut allocator, gid).await {
            Ok(Assigned::Fresh { osggid, companion }) => {
                report.identifiers_added.push((gid, osggid));
                if companion {
                    report.companions_added.push(gid);
                }
            }
            Ok(Assigned::AlreadyDone) => {
                info!(gid, "osggid appeared since the snapshot, skipping");
                report.skipped.push(gid);
            }
            Err(err) => report.record_failure(gid, err)?,
        }
    }

    for &gid in &plan.need_cluster_links {
        match accessor.add_cluster_group(gid, config.cluster_id).await {
            Ok(()) => {
                info!(gid, cluster_id = config.cluster_id, "linked group into cluster");
                report.links_created.push(gid);
            }
            Err(err) => report.record_failure(gid, err)?,
        }
    }

    for &gid in &plan.need_provisioning {
        match accessor
            .provision_group(gid, config.provision_target_id)
            .await
        {
            Ok(()) => {
                info!(gid, "provisioned group");
                report.groups_provisioned.push(gid);
            }
            Err(err) => report.record_failure(gid, err)?,
        }
    }

    info!(
        identifiers = report.identifiers_added.len(),
        companions = report.companions_added.len(),
        links = report.links_created.len(),
        provisioned = report.groups_provisioned.len(),
        skipped = report.skipped.len(),
        failures = report.failures.len(),
        "plan applied"
    );
    Ok(report)
}

enum Assigned {
    Fresh { osggid: i64, companion: bool },
    AlreadyDone,
}

/// Give one group its `osggid` and, when absent, the lower-cased
/// `osggroup` companion.
async fn assign_identifiers(
    accessor: &RegistryAccessor,
    snapshot: &Snapshot,
    allocator: &mut GidAllocator,
    gid: i64,
) -> Result<Assigned, RegistryError> {
    let current = accessor.group_identifiers(gid).await?;
    if identifier_of_type(&current, &IdentifierType::OsgGid).is_some() {
        return Ok(Assigned::AlreadyDone);
    }

    let osggid = allocator.allocate();
    accessor
        .add_group_identifier(gid, IdentifierType::OsgGid, &osggid.to_string())
        .await?;
    info!(gid, osggid, "assigned osggid");

    // Re-read between writes in case a companion landed concurrently.
    let current = accessor.group_identifiers(gid).await?;
    if identifier_of_type(&current, &IdentifierType::OsgGroup).is_some() {
        return Ok(Assigned::Fresh {
            osggid,
            companion: false,
        });
    }

    let name = snapshot
        .groups
        .iter()
        .find(|g| g.gid == gid)
        .map(|g| g.name.to_lowercase())
        .unwrap_or_default();
    accessor
        .add_group_identifier(gid, IdentifierType::OsgGroup, &name)
        .await?;
    info!(gid, osggroup = %name, "assigned osggroup companion");
    Ok(Assigned::Fresh {
        osggid,
        companion: true,
    })
}

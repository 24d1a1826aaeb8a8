//! Reconcile command - one snapshot/plan/apply pass

use clap::Args;
use tracing::info;

use crate::config::{DirectoryArgs, RegistryArgs};
use crate::error::{CliError, CliResult};

/// Arguments for the reconcile command
#[derive(Args)]
pub struct ReconcileArgs {
    #[command(flatten)]
    pub registry: RegistryArgs,

    #[command(flatten)]
    pub directory: DirectoryArgs,
}

/// Execute the reconcile command
pub async fn execute(args: ReconcileArgs) -> CliResult<()> {
    let engine = args.registry.engine()?;
    let reader = args.directory.reader()?;

    let directory_gids = reader.group_gids().await?;
    info!(gids = directory_gids.len(), "read directory group gids");

    let summary = engine.reconcile(directory_gids).await?;

    println!(
        "groups: {} ({} projects, {} skipped)",
        summary.groups_seen,
        summary.projects_seen,
        summary.skipped_groups.len()
    );
    for (gid, osggid) in &summary.report.identifiers_added {
        println!("group {gid}: assigned osggid {osggid}");
    }
    for gid in &summary.report.links_created {
        println!("group {gid}: linked into cluster");
    }
    for gid in &summary.report.groups_provisioned {
        println!("group {gid}: provisioned");
    }
    for gid in &summary.plan.duplicate_osggid_gids {
        println!("group {gid}: duplicate osggid identifiers, run `regsync fixup`");
    }
    for (gid, err) in &summary.report.failures {
        eprintln!("group {gid}: {err}");
    }

    if summary.report.failures.is_empty() {
        Ok(())
    } else {
        Err(CliError::Incomplete {
            failures: summary.report.failures.len(),
        })
    }
}

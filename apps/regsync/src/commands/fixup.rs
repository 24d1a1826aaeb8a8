//! Fixup command - repair groups damaged by the old cluster tooling

use clap::Args;

use crate::config::RegistryArgs;
use crate::error::{CliError, CliResult};

/// Arguments for the fixup command
#[derive(Args)]
pub struct FixupArgs {
    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Repair only this group
    #[arg(long)]
    pub gid: Option<i64>,

    /// Perform the repairs; without this flag only report what would
    /// change
    #[arg(long)]
    pub apply: bool,
}

/// Execute the fixup command
pub async fn execute(args: FixupArgs) -> CliResult<()> {
    let engine = args.registry.engine()?;

    if !args.apply {
        let inspections = engine.inspect().await?;
        let mut damaged = 0;
        for inspection in &inspections {
            if let Some(gid) = args.gid {
                if inspection.gid != gid {
                    continue;
                }
            }
            if !inspection.needs_fixup() {
                continue;
            }
            damaged += 1;
            println!("group {} ({}):", inspection.gid, inspection.name);
            if inspection.name != inspection.fixed_name {
                println!("  would rename to {:?}", inspection.fixed_name);
            }
            for id in &inspection.doomed_identifiers {
                let identifier = inspection
                    .identifiers
                    .iter()
                    .find(|i| i.id == *id)
                    .map(|i| format!("{} {:?}", i.kind, i.value))
                    .unwrap_or_default();
                println!("  would delete identifier {id} ({identifier})");
            }
        }
        println!("{damaged} group(s) need fixup (rerun with --apply)");
        return Ok(());
    }

    if let Some(gid) = args.gid {
        let report = engine.fixup_group(gid).await?;
        print_report(&report);
        return Ok(());
    }

    let batch = engine.fixup_all().await?;
    for report in &batch.completed {
        print_report(report);
    }
    for (gid, err) in &batch.failed {
        eprintln!("group {gid}: {err}");
    }
    if batch.failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::Incomplete {
            failures: batch.failed.len(),
        })
    }
}

fn print_report(report: &regsync_engine::FixupReport) {
    if let Some((old, new)) = &report.renamed {
        println!("group {}: renamed {old:?} -> {new:?}", report.gid);
    }
    for id in &report.deleted_identifiers {
        println!("group {}: deleted identifier {id}", report.gid);
    }
    println!(
        "group {}: reprovisioned with {} member(s)",
        report.gid,
        report.provisioned_members.len()
    );
}

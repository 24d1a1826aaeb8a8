//! Create-project command - mark an existing group as a managed project

use clap::Args;

use crate::config::RegistryArgs;
use crate::error::CliResult;

/// Arguments for the create-project command
#[derive(Args)]
pub struct CreateProjectArgs {
    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Name of the group to mark as a project
    pub name: String,
}

/// Execute the create-project command
pub async fn execute(args: CreateProjectArgs) -> CliResult<()> {
    let engine = args.registry.engine()?;
    let gid = engine.create_project(&args.name).await?;
    println!("group {gid} ({}) is a project", args.name);
    println!("run `regsync reconcile` to assign its gid and provision it");
    Ok(())
}

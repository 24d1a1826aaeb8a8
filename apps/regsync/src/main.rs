//! regsync - keep identity-registry groups, unix cluster links, and
//! the directory in agreement
//!
//! Subcommands:
//! - `reconcile`: one snapshot/plan/apply pass
//! - `fixup`: repair groups damaged by the old cluster tooling
//! - `usermap`: render the project/user map
//! - `create-project`: mark an existing group as a managed project

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod credentials;
mod error;

use error::CliResult;

/// Registry/cluster/directory reconciliation
#[derive(Parser)]
#[command(name = "regsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconcile pass against the registry and directory
    Reconcile(commands::reconcile::ReconcileArgs),

    /// Inspect or repair damaged groups
    Fixup(commands::fixup::FixupArgs),

    /// Render the project/user map
    Usermap(commands::usermap::UsermapArgs),

    /// Mark an existing group as a managed project
    CreateProject(commands::create_project::CreateProjectArgs),
}

// Registry traffic is strictly sequential; a single-threaded runtime
// is all the CLI needs.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Reconcile(args) => commands::reconcile::execute(args).await,
        Commands::Fixup(args) => commands::fixup::execute(args).await,
        Commands::Usermap(args) => commands::usermap::execute(args).await,
        Commands::CreateProject(args) => commands::create_project::execute(args).await,
    }
}

//! Usermap command - render the project/user map

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::config::RegistryArgs;
use crate::error::CliResult;
use regsync_engine::{FileCache, UsermapOptions};

/// Arguments for the usermap command
#[derive(Args)]
pub struct UsermapArgs {
    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Restrict the map to members of this registry group
    #[arg(long)]
    pub filter_group: Option<String>,

    /// Extra usermap files merged over the registry-derived map
    #[arg(long = "localmap")]
    pub local_maps: Vec<PathBuf>,

    /// Cache file for the registry-derived map
    #[arg(long)]
    pub cache_file: Option<PathBuf>,

    /// Cache lifetime in seconds
    #[arg(long, default_value_t = 1800)]
    pub cache_lifetime: u64,

    /// Write the map here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the usermap command
pub async fn execute(args: UsermapArgs) -> CliResult<()> {
    let engine = args.registry.engine()?;

    let options = UsermapOptions {
        filter_group: args.filter_group.clone(),
        local_maps: args.local_maps.clone(),
        cache: args
            .cache_file
            .as_ref()
            .map(|path| FileCache::new(path, Duration::from_secs(args.cache_lifetime))),
    };

    let map = engine.usermap(&options).await?;
    let rendered = map.render();
    match &args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => print!("{rendered}"),
    }
    Ok(())
}

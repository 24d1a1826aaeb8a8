//! Shared connection arguments.

use std::path::PathBuf;

use clap::Args;
use regsync_client::{ApiClient, RetryPolicy};
use regsync_directory::{DirectoryConfig, DirectoryReader};
use regsync_engine::{Engine, EngineConfig};
use regsync_registry::RegistryAccessor;

use crate::credentials;
use crate::error::{CliError, CliResult};

const LDAP_PASS_ENV: &str = "LDAP_PASS";

/// Registry connection and deployment ids.
#[derive(Args, Debug)]
pub struct RegistryArgs {
    /// Registry API endpoint base URL
    #[arg(long, env = "REGISTRY_ENDPOINT")]
    pub endpoint: String,

    /// API user, as `user` or `user:password`; with no inline password
    /// the password file or the PASS environment variable is used
    #[arg(short, long)]
    pub user: String,

    /// File holding the API password
    #[arg(short = 'd', long = "passfile")]
    pub password_file: Option<PathBuf>,

    /// Organization (CO) id whose groups are managed
    #[arg(long, default_value_t = 7)]
    pub co_id: i64,

    /// Unix cluster id the groups are linked into
    #[arg(long, default_value_t = 1)]
    pub cluster_id: i64,

    /// Provisioning target that pushes to the directory
    #[arg(long, default_value_t = 3)]
    pub provision_target: i64,

    /// Lowest GID the allocator may assign
    #[arg(long, default_value_t = EngineConfig::DEFAULT_GID_FLOOR)]
    pub gid_floor: i64,
}

impl RegistryArgs {
    pub fn engine(&self) -> CliResult<Engine> {
        let credentials = credentials::resolve(&self.user, self.password_file.as_deref())?;
        let client = ApiClient::new(&self.endpoint, credentials, RetryPolicy::default())?;
        Ok(Engine::new(
            RegistryAccessor::new(client),
            EngineConfig {
                co_id: self.co_id,
                cluster_id: self.cluster_id,
                provision_target_id: self.provision_target,
                gid_floor: self.gid_floor,
            },
        ))
    }
}

/// Directory (LDAP) connection arguments.  Individually optional so
/// commands that may not need the directory can still flatten them;
/// [`DirectoryArgs::reader`] enforces completeness.
#[derive(Args, Debug)]
pub struct DirectoryArgs {
    /// Directory server URL
    #[arg(long = "ldap-url", env = "LDAP_URL")]
    pub url: Option<String>,

    /// Bind DN
    #[arg(long = "ldap-bind-dn", env = "LDAP_BIND_DN")]
    pub bind_dn: Option<String>,

    /// File holding the bind password; falls back to LDAP_PASS
    #[arg(long = "ldap-passfile")]
    pub password_file: Option<PathBuf>,

    /// Base DN the group and people subtrees hang off
    #[arg(long = "ldap-base-dn", env = "LDAP_BASE_DN")]
    pub base_dn: Option<String>,
}

impl DirectoryArgs {
    pub fn reader(&self) -> CliResult<DirectoryReader> {
        let require = |value: &Option<String>, flag: &str| {
            value
                .clone()
                .ok_or_else(|| CliError::Usage(format!("{flag} is required")))
        };
        let url = require(&self.url, "--ldap-url")?;
        let bind_dn = require(&self.bind_dn, "--ldap-bind-dn")?;
        let base_dn = require(&self.base_dn, "--ldap-base-dn")?;

        let auth_token = match &self.password_file {
            Some(path) => std::fs::read_to_string(path)?.trim_end().to_string(),
            None => std::env::var(LDAP_PASS_ENV)
                .map_err(|_| CliError::PassRequired)?,
        };
        Ok(DirectoryReader::new(DirectoryConfig {
            url,
            bind_dn,
            auth_token,
            base_dn,
        }))
    }
}

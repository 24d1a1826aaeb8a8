//! Read-only view of the provisioning target directory.
//!
//! This is an independent ground-truth source: it never goes through the
//! registry accessor, so the planner can detect divergence between
//! "registry says provisioned" and what the directory actually holds.

pub mod config;
pub mod reader;

use std::collections::{BTreeMap, BTreeSet};

pub use config::DirectoryConfig;
pub use reader::DirectoryReader;

use thiserror::Error;

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors surfaced by the directory reader.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Connection, bind, or search failure.
    #[error("directory error: {0}")]
    Ldap(#[from] ldap3::LdapError),

    /// A mandatory attribute was missing or non-numeric on an entry.
    #[error("directory entry {dn} has no usable {attribute}")]
    MalformedEntry { dn: String, attribute: &'static str },
}

/// A point-in-time, read-only capture of directory state.
///
/// Plain data so the engine (and its tests) can operate without a live
/// server.
#[derive(Debug, Clone, Default)]
pub struct DirectoryState {
    /// GID numbers of groups present in the directory.
    pub group_gids: BTreeSet<i64>,
    /// Member uid lists keyed by group GID number.
    pub members: BTreeMap<i64, Vec<String>>,
}

impl DirectoryState {
    /// Whether a group with the given GID number is present.
    #[must_use]
    pub fn has_gid(&self, gid: i64) -> bool {
        self.group_gids.contains(&gid)
    }
}

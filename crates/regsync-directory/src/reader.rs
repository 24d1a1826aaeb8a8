//! LDAP search plumbing for the directory reader.

use std::collections::{BTreeMap, BTreeSet};

use ldap3::{Ldap, LdapConnAsync, Scope, SearchEntry};
use tracing::{debug, warn};

use crate::config::DirectoryConfig;
use crate::{DirectoryError, DirectoryResult, DirectoryState};

/// Read-only client for the directory server.
///
/// Opens one connection per call; a reconcile run reads the directory
/// once at snapshot time.
#[derive(Debug, Clone)]
pub struct DirectoryReader {
    config: DirectoryConfig,
}

impl DirectoryReader {
    #[must_use]
    pub fn new(config: DirectoryConfig) -> Self {
        Self { config }
    }

    async fn connect(&self) -> DirectoryResult<Ldap> {
        debug!(url = %self.config.url, "connecting to directory");
        let (conn, mut ldap) = LdapConnAsync::new(&self.config.url).await?;
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "directory connection driver error");
            }
        });
        ldap.simple_bind(&self.config.bind_dn, &self.config.auth_token)
            .await?
            .success()?;
        Ok(ldap)
    }

    /// Capture group presence and membership in one pass.
    pub async fn snapshot(&self) -> DirectoryResult<DirectoryState> {
        let mut ldap = self.connect().await?;
        let (entries, _result) = ldap
            .search(
                &self.config.groups_dn(),
                Scope::Subtree,
                "(cn=*)",
                vec!["gidNumber", "memberUid"],
            )
            .await?
            .success()?;

        let mut state = DirectoryState::default();
        for entry in entries {
            let entry = SearchEntry::construct(entry);
            let gid = gid_number(&entry)?;
            state.group_gids.insert(gid);
            let members = entry
                .attrs
                .get("memberUid")
                .cloned()
                .unwrap_or_default();
            state.members.insert(gid, members);
        }

        let _ = ldap.unbind().await;
        debug!(groups = state.group_gids.len(), "captured directory state");
        Ok(state)
    }

    /// GID numbers of all groups present in the directory.
    pub async fn group_gids(&self) -> DirectoryResult<BTreeSet<i64>> {
        Ok(self.snapshot().await?.group_gids)
    }

    /// Identities of active directory members, optionally restricted to
    /// members of one named group.
    pub async fn active_users(
        &self,
        filter_group: Option<&str>,
    ) -> DirectoryResult<BTreeSet<String>> {
        let mut ldap = self.connect().await?;
        let filter = match filter_group {
            Some(group) => format!(
                "(&(uid=*)(isMemberOf=cn={group},{}))",
                self.config.groups_dn()
            ),
            None => "(uid=*)".to_string(),
        };
        let (entries, _result) = ldap
            .search(&self.config.people_dn(), Scope::Subtree, &filter, vec!["uid"])
            .await?
            .success()?;

        let mut users = BTreeSet::new();
        for entry in entries {
            let entry = SearchEntry::construct(entry);
            if let Some(uid) = entry.attrs.get("uid").and_then(|v| v.first()) {
                users.insert(uid.clone());
            }
        }

        let _ = ldap.unbind().await;
        Ok(users)
    }

    /// Member uid lists keyed by group GID number.
    pub async fn group_members(&self) -> DirectoryResult<BTreeMap<i64, Vec<String>>> {
        Ok(self.snapshot().await?.members)
    }
}

fn gid_number(entry: &SearchEntry) -> DirectoryResult<i64> {
    entry
        .attrs
        .get("gidNumber")
        .and_then(|values| values.first())
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| DirectoryError::MalformedEntry {
            dn: entry.dn.clone(),
            attribute: "gidNumber",
        })
}

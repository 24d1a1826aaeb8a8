//! Typed read/write operations against the registry.

use std::collections::BTreeSet;

use regsync_client::ApiClient;
use reqwest::Method;
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::models::{
    CoGroup, CoGroupsResponse, CreatedResponse, GroupMember, GroupMembersResponse, GroupWrite,
    Identifier, IdentifierType, IdentifierWrite, IdentifiersResponse, ProvisionRequest,
    UnixClusterGroupWrite, UnixClusterGroupsResponse,
};

/// Thin typed layer over the raw API client.
///
/// Reads default an absent response or list field to an empty sequence.
/// Writes are fire-and-confirm: the registry does not guarantee
/// idempotence, so callers re-read when it matters.
#[derive(Debug, Clone)]
pub struct RegistryAccessor {
    client: ApiClient,
}

impl RegistryAccessor {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    // ── Reads ─────────────────────────────────────────────────────────

    /// All groups of an organization.
    pub async fn groups(&self, co_id: i64) -> RegistryResult<Vec<CoGroup>> {
        let env: Option<CoGroupsResponse> = self
            .client
            .get("co_groups.json", &[("coid", co_id.to_string())])
            .await?;
        Ok(env.map(|e| e.co_groups).unwrap_or_default())
    }

    /// One group by id; [`RegistryError::NotFound`] when the registry
    /// returns an empty set.
    pub async fn group(&self, gid: i64) -> RegistryResult<CoGroup> {
        let env: Option<CoGroupsResponse> = self
            .client
            .get(&format!("co_groups/{gid}.json"), &[])
            .await?;
        env.and_then(|e| e.co_groups.into_iter().next())
            .ok_or_else(|| RegistryError::not_found("CO group", gid))
    }

    /// Resolve a group name to its id.  Fails when the name is absent or
    /// matches more than one group.
    pub async fn group_by_name(&self, co_id: i64, name: &str) -> RegistryResult<CoGroup> {
        let matching: Vec<CoGroup> = self
            .groups(co_id)
            .await?
            .into_iter()
            .filter(|g| g.name == name)
            .collect();
        match matching.len() {
            0 => Err(RegistryError::not_found("CO group", name)),
            1 => Ok(matching.into_iter().next().unwrap()),
            count => Err(RegistryError::Ambiguous {
                name: name.to_string(),
                count,
            }),
        }
    }

    /// Identifiers attached to a group.
    pub async fn group_identifiers(&self, gid: i64) -> RegistryResult<Vec<Identifier>> {
        let env: Option<IdentifiersResponse> = self
            .client
            .get("identifiers.json", &[("cogroupid", gid.to_string())])
            .await?;
        Ok(env.map(|e| e.identifiers).unwrap_or_default())
    }

    /// Identifiers attached to a person.
    pub async fn person_identifiers(&self, pid: i64) -> RegistryResult<Vec<Identifier>> {
        let env: Option<IdentifiersResponse> = self
            .client
            .get("identifiers.json", &[("copersonid", pid.to_string())])
            .await?;
        Ok(env.map(|e| e.identifiers).unwrap_or_default())
    }

    /// One identifier by id; NotFound when the registry returns nothing.
    pub async fn identifier(&self, id: i64) -> RegistryResult<Identifier> {
        let env: Option<IdentifiersResponse> = self
            .client
            .get(&format!("identifiers/{id}.json"), &[])
            .await?;
        env.and_then(|e| e.identifiers.into_iter().next())
            .ok_or_else(|| RegistryError::not_found("identifier", id))
    }

    /// Membership records of a group.
    pub async fn group_members(&self, gid: i64) -> RegistryResult<Vec<GroupMember>> {
        let env: Option<GroupMembersResponse> = self
            .client
            .get("co_group_members.json", &[("cogroupid", gid.to_string())])
            .await?;
        Ok(env.map(|e| e.members).unwrap_or_default())
    }

    /// Group ids already linked to the given unix cluster.
    pub async fn cluster_group_ids(&self, cluster_id: i64) -> RegistryResult<BTreeSet<i64>> {
        let env: Option<UnixClusterGroupsResponse> = self
            .client
            .get(
                "unix_cluster/unix_cluster_groups.json",
                &[("unix_cluster_id", cluster_id.to_string())],
            )
            .await?;
        Ok(env
            .map(|e| e.groups.into_iter().map(|g| g.co_group_id).collect())
            .unwrap_or_default())
    }

    // ── Writes ────────────────────────────────────────────────────────

    /// Rename a group, carrying its current CoId/Status/Version through.
    pub async fn rename_group(&self, group: &CoGroup, new_name: &str) -> RegistryResult<()> {
        debug!(gid = group.id, old = %group.name, new = %new_name, "renaming group");
        let body = GroupWrite::rename(group, new_name);
        let _: Option<serde_json::Value> = self
            .client
            .send(Method::PUT, &format!("co_groups/{}.json", group.id), &body)
            .await?;
        Ok(())
    }

    /// Attach an identifier to a group, returning the new identifier id
    /// when the registry reports one.
    pub async fn add_group_identifier(
        &self,
        gid: i64,
        kind: IdentifierType,
        value: &str,
    ) -> RegistryResult<Option<i64>> {
        debug!(gid, kind = %kind, value, "adding group identifier");
        let body = IdentifierWrite::for_group(gid, kind, value.to_string());
        let created: Option<CreatedResponse> = self
            .client
            .send(Method::POST, "identifiers.json", &body)
            .await?;
        Ok(created.map(|c| c.id))
    }

    /// Attach the `ospoolproject` marker (`Yes-<project>`) to a group.
    pub async fn add_project_identifier(
        &self,
        gid: i64,
        project_name: &str,
    ) -> RegistryResult<Option<i64>> {
        self.add_group_identifier(
            gid,
            IdentifierType::OspoolProject,
            &format!("Yes-{project_name}"),
        )
        .await
    }

    /// Delete one identifier by id.
    pub async fn delete_identifier(&self, id: i64) -> RegistryResult<()> {
        debug!(id, "deleting identifier");
        self.client
            .send_empty(Method::DELETE, &format!("identifiers/{id}.json"))
            .await?;
        Ok(())
    }

    /// Link a group into a unix cluster namespace.  No update/delete path
    /// exists; the caller must not schedule a duplicate link.
    pub async fn add_cluster_group(&self, gid: i64, cluster_id: i64) -> RegistryResult<()> {
        debug!(gid, cluster_id, "creating unix cluster group link");
        let body = UnixClusterGroupWrite::link(gid, cluster_id);
        let _: Option<serde_json::Value> = self
            .client
            .send(Method::POST, "unix_cluster/unix_cluster_groups.json", &body)
            .await?;
        Ok(())
    }

    /// Trigger directory provisioning for a group.
    pub async fn provision_group(&self, gid: i64, target_id: i64) -> RegistryResult<()> {
        debug!(gid, target_id, "provisioning group");
        let path =
            format!("co_provisioning_targets/provision/{target_id}/cogroupid:{gid}.json");
        let _: Option<serde_json::Value> = self
            .client
            .send(Method::POST, &path, &ProvisionRequest::group())
            .await?;
        Ok(())
    }

    /// Trigger directory provisioning for a person.
    pub async fn provision_person(&self, pid: i64, target_id: i64) -> RegistryResult<()> {
        debug!(pid, target_id, "provisioning person");
        let path =
            format!("co_provisioning_targets/provision/{target_id}/copersonid:{pid}.json");
        let _: Option<serde_json::Value> = self
            .client
            .send(Method::POST, &path, &ProvisionRequest::person())
            .await?;
        Ok(())
    }

    /// Provision every current `CO` member of a group, returning the
    /// person ids that were pushed.
    pub async fn provision_group_members(
        &self,
        gid: i64,
        target_id: i64,
    ) -> RegistryResult<Vec<i64>> {
        let mut provisioned = Vec::new();
        for member in self.group_members(gid).await? {
            if member.person.kind == "CO" {
                self.provision_person(member.person.id, target_id).await?;
                provisioned.push(member.person.id);
            }
        }
        Ok(provisioned)
    }
}

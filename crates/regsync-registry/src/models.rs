//! Registry wire types.
//!
//! Field names mirror the registry's JSON exactly; list fields on read
//! envelopes default to empty so an absent field never null-dereferences.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The typed identifier kinds the engine cares about.  Unknown types are
/// preserved verbatim so a snapshot round-trips foreign identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IdentifierType {
    /// Numeric unix GID assigned to a group.
    OsgGid,
    /// Display-name companion identifier (lower-cased group name).
    OsgGroup,
    /// Project flag; a `Yes-` prefixed value marks the group as a project.
    OspoolProject,
    /// Per-person login identifier.
    OsgUser,
    /// Any identifier type this engine does not act on.
    Other(String),
}

impl IdentifierType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            IdentifierType::OsgGid => "osggid",
            IdentifierType::OsgGroup => "osggroup",
            IdentifierType::OspoolProject => "ospoolproject",
            IdentifierType::OsgUser => "osguser",
            IdentifierType::Other(s) => s,
        }
    }
}

impl From<String> for IdentifierType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "osggid" => IdentifierType::OsgGid,
            "osggroup" => IdentifierType::OsgGroup,
            "ospoolproject" => IdentifierType::OspoolProject,
            "osguser" => IdentifierType::OsgUser,
            _ => IdentifierType::Other(s),
        }
    }
}

impl From<IdentifierType> for String {
    fn from(t: IdentifierType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registry-managed group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoGroup {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Status", default = "default_status")]
    pub status: String,
    #[serde(rename = "Version", default = "default_version")]
    pub version: i64,
    #[serde(rename = "CoId", default)]
    pub co_id: i64,
}

fn default_status() -> String {
    "Active".to_string()
}

fn default_version() -> i64 {
    1
}

/// A typed, valued attribute attached to a group or person.  Never
/// mutated in place; fixup deletes and recreates instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Type")]
    pub kind: IdentifierType,
    #[serde(rename = "Identifier")]
    pub value: String,
    #[serde(rename = "Status", default = "default_status")]
    pub status: String,
}

impl Identifier {
    /// Numeric reading of the value, `None` when not a number.
    #[must_use]
    pub fn numeric_value(&self) -> Option<i64> {
        self.value.trim().parse().ok()
    }
}

/// Owner reference on a membership or identifier record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRef {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Id")]
    pub id: i64,
}

/// One group-membership record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    #[serde(rename = "Person")]
    pub person: PersonRef,
    #[serde(rename = "Member", default)]
    pub member: bool,
}

/// Association between a group and a unix cluster namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnixClusterGroup {
    #[serde(rename = "UnixClusterId")]
    pub unix_cluster_id: i64,
    #[serde(rename = "CoGroupId")]
    pub co_group_id: i64,
}

// ── Read envelopes ────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CoGroupsResponse {
    #[serde(rename = "CoGroups", default)]
    pub co_groups: Vec<CoGroup>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IdentifiersResponse {
    #[serde(rename = "Identifiers", default)]
    pub identifiers: Vec<Identifier>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GroupMembersResponse {
    #[serde(rename = "CoGroupMembers", default)]
    pub members: Vec<GroupMember>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UnixClusterGroupsResponse {
    #[serde(rename = "UnixClusterGroups", default)]
    pub groups: Vec<UnixClusterGroup>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedResponse {
    #[serde(rename = "Id")]
    pub id: i64,
}

// ── Write envelopes ───────────────────────────────────────────────────
//
// Every write body carries `Version: "1.0"` and a `RequestType`
// discriminator naming the entity, with the payload as a singleton list.

#[derive(Debug, Serialize)]
pub(crate) struct NewIdentifier {
    #[serde(rename = "Version")]
    pub version: &'static str,
    #[serde(rename = "Type")]
    pub kind: IdentifierType,
    #[serde(rename = "Identifier")]
    pub value: String,
    #[serde(rename = "Login")]
    pub login: bool,
    #[serde(rename = "Person")]
    pub person: PersonRef,
    #[serde(rename = "Status")]
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct IdentifierWrite {
    #[serde(rename = "RequestType")]
    pub request_type: &'static str,
    #[serde(rename = "Version")]
    pub version: &'static str,
    #[serde(rename = "Identifiers")]
    pub identifiers: Vec<NewIdentifier>,
}

impl IdentifierWrite {
    pub fn for_group(gid: i64, kind: IdentifierType, value: String) -> Self {
        Self {
            request_type: "Identifiers",
            version: "1.0",
            identifiers: vec![NewIdentifier {
                version: "1.0",
                kind,
                value,
                login: false,
                person: PersonRef {
                    kind: "Group".to_string(),
                    id: gid,
                },
                status: "Active",
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GroupUpdate {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "CoId")]
    pub co_id: i64,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Version")]
    pub version: i64,
}

/// Minimal rename request: Name+CoId+Status+Version only.
#[derive(Debug, Serialize)]
pub(crate) struct GroupWrite {
    #[serde(rename = "CoGroups")]
    pub co_groups: Vec<GroupUpdate>,
    #[serde(rename = "RequestType")]
    pub request_type: &'static str,
    #[serde(rename = "Version")]
    pub version: &'static str,
}

impl GroupWrite {
    pub fn rename(group: &CoGroup, new_name: &str) -> Self {
        Self {
            co_groups: vec![GroupUpdate {
                name: new_name.to_string(),
                co_id: group.co_id,
                status: group.status.clone(),
                version: group.version,
            }],
            request_type: "CoGroups",
            version: "1.0",
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewUnixClusterGroup {
    #[serde(rename = "Version")]
    pub version: &'static str,
    #[serde(rename = "UnixClusterId")]
    pub unix_cluster_id: i64,
    #[serde(rename = "CoGroupId")]
    pub co_group_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct UnixClusterGroupWrite {
    #[serde(rename = "RequestType")]
    pub request_type: &'static str,
    #[serde(rename = "Version")]
    pub version: &'static str,
    #[serde(rename = "UnixClusterGroups")]
    pub groups: Vec<NewUnixClusterGroup>,
}

impl UnixClusterGroupWrite {
    pub fn link(gid: i64, cluster_id: i64) -> Self {
        Self {
            request_type: "UnixClusterGroups",
            version: "1.0",
            groups: vec![NewUnixClusterGroup {
                version: "1.0",
                unix_cluster_id: cluster_id,
                co_group_id: gid,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProvisionRequest {
    #[serde(rename = "RequestType")]
    pub request_type: &'static str,
    #[serde(rename = "Version")]
    pub version: &'static str,
    #[serde(rename = "Synchronous")]
    pub synchronous: bool,
}

impl ProvisionRequest {
    pub fn group() -> Self {
        Self {
            request_type: "CoGroupProvisioning",
            version: "1.0",
            synchronous: true,
        }
    }

    pub fn person() -> Self {
        Self {
            request_type: "CoPersonProvisioning",
            version: "1.0",
            synchronous: true,
        }
    }
}

// ── Identifier-list helpers ───────────────────────────────────────────

/// First identifier of the given type, if present.
#[must_use]
pub fn identifier_of_type<'a>(
    identifiers: &'a [Identifier],
    kind: &IdentifierType,
) -> Option<&'a Identifier> {
    identifiers.iter().find(|i| &i.kind == kind)
}

/// Value of the first identifier of the given type.
#[must_use]
pub fn identifier_value<'a>(
    identifiers: &'a [Identifier],
    kind: &IdentifierType,
) -> Option<&'a str> {
    identifier_of_type(identifiers, kind).map(|i| i.value.as_str())
}

/// Whether the first identifier of the given type matches the pattern
/// (anchored at the start, like the registry scripts' `re.match`).
#[must_use]
pub fn identifier_matches(
    identifiers: &[Identifier],
    kind: &IdentifierType,
    pattern: &Regex,
) -> bool {
    match identifier_value(identifiers, kind) {
        Some(value) => pattern
            .find(value)
            .is_some_and(|m| m.start() == 0),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(id: i64, kind: &str, value: &str) -> Identifier {
        Identifier {
            id,
            kind: IdentifierType::from(kind.to_string()),
            value: value.to_string(),
            status: "Active".to_string(),
        }
    }

    #[test]
    fn identifier_type_round_trips_through_strings() {
        for (s, t) in [
            ("osggid", IdentifierType::OsgGid),
            ("osggroup", IdentifierType::OsgGroup),
            ("ospoolproject", IdentifierType::OspoolProject),
            ("osguser", IdentifierType::OsgUser),
        ] {
            assert_eq!(IdentifierType::from(s.to_string()), t);
            assert_eq!(t.as_str(), s);
        }
        let other = IdentifierType::from("eppn".to_string());
        assert_eq!(other, IdentifierType::Other("eppn".to_string()));
    }

    #[test]
    fn envelope_tolerates_absent_list_field() {
        let env: CoGroupsResponse = serde_json::from_str("{}").unwrap();
        assert!(env.co_groups.is_empty());
    }

    #[test]
    fn identifier_write_envelope_shape() {
        let write = IdentifierWrite::for_group(42, IdentifierType::OsgGid, "200000".into());
        let json = serde_json::to_value(&write).unwrap();
        assert_eq!(json["RequestType"], "Identifiers");
        assert_eq!(json["Version"], "1.0");
        assert_eq!(json["Identifiers"][0]["Type"], "osggid");
        assert_eq!(json["Identifiers"][0]["Identifier"], "200000");
        assert_eq!(json["Identifiers"][0]["Person"]["Type"], "Group");
        assert_eq!(json["Identifiers"][0]["Person"]["Id"], 42);
        assert_eq!(json["Identifiers"][0]["Status"], "Active");
        assert_eq!(json["Identifiers"][0]["Login"], false);
    }

    #[test]
    fn rename_envelope_carries_name_coid_status_version() {
        let group = CoGroup {
            id: 9,
            name: "Foo UnixCluster Group".into(),
            description: String::new(),
            status: "Active".into(),
            version: 3,
            co_id: 7,
        };
        let json = serde_json::to_value(GroupWrite::rename(&group, "Foo")).unwrap();
        assert_eq!(json["RequestType"], "CoGroups");
        assert_eq!(json["CoGroups"][0]["Name"], "Foo");
        assert_eq!(json["CoGroups"][0]["CoId"], 7);
        assert_eq!(json["CoGroups"][0]["Version"], 3);
    }

    #[test]
    fn provision_envelopes_are_synchronous() {
        let json = serde_json::to_value(ProvisionRequest::group()).unwrap();
        assert_eq!(json["RequestType"], "CoGroupProvisioning");
        assert_eq!(json["Synchronous"], true);
        let json = serde_json::to_value(ProvisionRequest::person()).unwrap();
        assert_eq!(json["RequestType"], "CoPersonProvisioning");
    }

    #[test]
    fn helpers_pick_first_of_type() {
        let ids = vec![
            ident(1, "ospoolproject", "Yes-proj1"),
            ident(2, "osggid", "200001"),
            ident(3, "osggid", "200005"),
        ];
        assert_eq!(
            identifier_value(&ids, &IdentifierType::OsgGid),
            Some("200001")
        );
        assert!(identifier_value(&ids, &IdentifierType::OsgUser).is_none());

        let prefix = Regex::new("Yes-").unwrap();
        assert!(identifier_matches(
            &ids,
            &IdentifierType::OspoolProject,
            &prefix
        ));
        // Anchored at the start: a mid-string match does not count.
        let ids = vec![ident(4, "ospoolproject", "No-but-Yes-later")];
        assert!(!identifier_matches(
            &ids,
            &IdentifierType::OspoolProject,
            &prefix
        ));
    }

    #[test]
    fn numeric_value_parses_or_none() {
        assert_eq!(ident(1, "osggid", "200000").numeric_value(), Some(200000));
        assert_eq!(ident(1, "osggid", " 7 ").numeric_value(), Some(7));
        assert!(ident(1, "osggroup", "proj1").numeric_value().is_none());
    }
}

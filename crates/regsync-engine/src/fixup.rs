//! Repair pass for groups damaged by historical cluster tooling:
//! mangled names, duplicated `osggid` identifiers, and leftover
//! `osggroup` markers ending in `unixclustergroup`.

use std::sync::LazyLock;

use regex::Regex;
use regsync_registry::{Identifier, IdentifierType};

/// Captures the original name out of `<name> UnixCluster Group`
/// suffixed variants.  The capture is greedy, so a doubly-suffixed name
/// loses one suffix per application; repeated application converges.
static MANGLED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*) UnixCluster Group$").expect("static regex"));

/// The name a group should carry, with any `UnixCluster Group` suffix
/// stripped.  Already-clean names come back unchanged, so applying the
/// fix twice is a no-op.
#[must_use]
pub fn fixed_group_name(name: &str) -> &str {
    match MANGLED_NAME.captures(name) {
        Some(caps) => caps.get(1).map_or(name, |m| m.as_str()),
        None => name,
    }
}

/// Identifier ids that fixup should delete from a group:
///
/// * every `osggid` beyond the one with the highest numeric value
///   (ties broken by identifier id, keeping the newest), and
/// * every `osggroup` whose value ends in `unixclustergroup`.
#[must_use]
pub fn identifiers_to_delete(identifiers: &[Identifier]) -> Vec<i64> {
    let mut doomed = Vec::new();

    let gids: Vec<&Identifier> = identifiers
        .iter()
        .filter(|i| i.kind == IdentifierType::OsgGid)
        .collect();
    if gids.len() > 1 {
        let keep = gids
            .iter()
            .max_by_key(|i| (i.numeric_value().unwrap_or(i64::MIN), i.id))
            .map(|i| i.id);
        doomed.extend(gids.iter().filter(|i| Some(i.id) != keep).map(|i| i.id));
    }

    doomed.extend(
        identifiers
            .iter()
            .filter(|i| i.kind == IdentifierType::OsgGroup)
            .filter(|i| i.value.ends_with("unixclustergroup"))
            .map(|i| i.id),
    );

    doomed
}

/// Whether the name still carries the mangled suffix.  Repair sweeps
/// target exactly these groups.
#[must_use]
pub fn is_misnamed(name: &str) -> bool {
    fixed_group_name(name) != name
}

/// Whether a group looks like it was touched by the old cluster
/// tooling and is worth inspecting.
#[must_use]
pub fn is_fixup_candidate(name: &str, description: &str) -> bool {
    name.contains("UnixCluster Group") || description.contains("automatically by UnixCluster")
}

/// What fixup did (or would do) to one group.
#[derive(Debug, Clone, Default)]
pub struct FixupReport {
    pub gid: i64,
    /// `(old, new)` when the name was repaired.
    pub renamed: Option<(String, String)>,
    /// Identifier ids removed.
    pub deleted_identifiers: Vec<i64>,
    /// Person ids re-provisioned after the repair.
    pub provisioned_members: Vec<i64>,
}

impl FixupReport {
    #[must_use]
    pub fn changed(&self) -> bool {
        self.renamed.is_some() || !self.deleted_identifiers.is_empty()
    }
}

/// Outcome of a fixup sweep over many groups.  One group failing does
/// not stop the sweep.
#[derive(Debug, Default)]
pub struct FixupBatchReport {
    pub completed: Vec<FixupReport>,
    /// `(gid, error)` for groups whose repair failed.
    pub failed: Vec<(i64, String)>,
}

/// Read-only findings for one group, for operator display.
#[derive(Debug, Clone)]
pub struct GroupInspection {
    pub gid: i64,
    pub name: String,
    pub fixed_name: String,
    pub identifiers: Vec<Identifier>,
    pub doomed_identifiers: Vec<i64>,
}

impl GroupInspection {
    #[must_use]
    pub fn needs_fixup(&self) -> bool {
        self.name != self.fixed_name || !self.doomed_identifiers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(id: i64, kind: IdentifierType, value: &str) -> Identifier {
        Identifier {
            id,
            kind,
            value: value.to_string(),
            status: "Active".to_string(),
        }
    }

    #[test]
    fn strips_the_mangled_suffix() {
        assert_eq!(fixed_group_name("proj1 UnixCluster Group"), "proj1");
        assert_eq!(
            fixed_group_name("proj1 UnixCluster Group UnixCluster Group"),
            "proj1 UnixCluster Group"
        );
    }

    #[test]
    fn clean_names_pass_through() {
        assert_eq!(fixed_group_name("proj1"), "proj1");
        assert_eq!(fixed_group_name(fixed_group_name("p UnixCluster Group")), "p");
    }

    #[test]
    fn keeps_the_highest_duplicate_gid() {
        let identifiers = vec![
            ident(11, IdentifierType::OsgGid, "100"),
            ident(12, IdentifierType::OsgGid, "105"),
        ];
        assert_eq!(identifiers_to_delete(&identifiers), vec![11]);
    }

    #[test]
    fn three_way_duplicates_keep_only_the_max() {
        let identifiers = vec![
            ident(1, IdentifierType::OsgGid, "100"),
            ident(2, IdentifierType::OsgGid, "300"),
            ident(3, IdentifierType::OsgGid, "200"),
        ];
        let mut doomed = identifiers_to_delete(&identifiers);
        doomed.sort_unstable();
        assert_eq!(doomed, vec![1, 3]);
    }

    #[test]
    fn single_gid_is_untouched() {
        let identifiers = vec![ident(1, IdentifierType::OsgGid, "100")];
        assert!(identifiers_to_delete(&identifiers).is_empty());
    }

    #[test]
    fn legacy_osggroup_markers_are_doomed() {
        let identifiers = vec![
            ident(1, IdentifierType::OsgGroup, "proj1"),
            ident(2, IdentifierType::OsgGroup, "proj1.unixclustergroup"),
        ];
        assert_eq!(identifiers_to_delete(&identifiers), vec![2]);
    }

    #[test]
    fn numeric_ties_keep_the_newest_identifier() {
        let identifiers = vec![
            ident(5, IdentifierType::OsgGid, "100"),
            ident(9, IdentifierType::OsgGid, "100"),
        ];
        assert_eq!(identifiers_to_delete(&identifiers), vec![5]);
    }

    #[test]
    fn candidate_detection() {
        assert!(is_fixup_candidate("p UnixCluster Group", ""));
        assert!(is_fixup_candidate("p", "Created automatically by UnixCluster"));
        assert!(!is_fixup_candidate("p", "an ordinary group"));
    }

    #[test]
    fn misnamed_requires_the_suffix() {
        assert!(is_misnamed("p UnixCluster Group"));
        // Description-marked autogroups with clean names are inspected
        // but not swept.
        assert!(!is_misnamed("p"));
    }
}

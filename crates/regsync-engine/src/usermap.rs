//! Project/user map: which login belongs to which projects.
//!
//! Rendered one line per user as `* <user> <proj1,proj2,...>`, users
//! and projects both sorted.  Maps merge by set union, so a user listed
//! in the registry and in a local override file keeps both memberships.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::cache::FileCache;

/// Options for building a usermap.
#[derive(Debug, Default)]
pub struct UsermapOptions {
    /// Restrict the map to members of this registry group; an unknown
    /// name is an error, not an empty map.
    pub filter_group: Option<String>,
    /// Extra usermap files merged over the registry-derived map.
    pub local_maps: Vec<PathBuf>,
    /// Optional cache for the registry-derived portion.
    pub cache: Option<FileCache>,
}

/// Mapping from login name to the set of projects it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usermap {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl Usermap {
    pub fn add(&mut self, user: impl Into<String>, project: impl Into<String>) {
        self.entries
            .entry(user.into())
            .or_default()
            .insert(project.into());
    }

    /// Union-merge another map into this one.
    pub fn merge(&mut self, other: Usermap) {
        for (user, projects) in other.entries {
            self.entries.entry(user).or_default().extend(projects);
        }
    }

    /// Drop users outside the allowed set.
    pub fn retain_users(&mut self, allowed: &BTreeSet<String>) {
        self.entries.retain(|user, _| allowed.contains(user));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn projects_of(&self, user: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(user)
    }

    /// Parse a local map file: one `* <user> <proj,proj,...>` line per
    /// user.  Blank lines and `#` comments are ignored; the project
    /// list splits on commas and spaces.
    #[must_use]
    pub fn parse_local_map(text: &str) -> Usermap {
        let mut map = Usermap::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some("*"), Some(user)) = (fields.next(), fields.next()) else {
                continue;
            };
            for field in fields {
                for project in field.split(',').filter(|p| !p.is_empty()) {
                    map.add(user, project);
                }
            }
        }
        map
    }

    /// Render in the `* user proj1,proj2` format.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (user, projects) in &self.entries {
            let joined: Vec<&str> = projects.iter().map(String::as_str).collect();
            out.push_str(&format!("* {user} {}\n", joined.join(",")));
        }
        out
    }

    /// Flatten for the file cache (projects comma-joined).
    #[must_use]
    pub fn to_cache_map(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(user, projects)| {
                let joined: Vec<&str> = projects.iter().map(String::as_str).collect();
                (user.clone(), joined.join(","))
            })
            .collect()
    }

    /// Rebuild from a cached flat map.
    #[must_use]
    pub fn from_cache_map(map: &BTreeMap<String, String>) -> Usermap {
        let mut usermap = Usermap::default();
        for (user, joined) in map {
            for project in joined.split(',').filter(|p| !p.is_empty()) {
                usermap.add(user.clone(), project);
            }
        }
        usermap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_sorted_and_comma_joined() {
        let mut map = Usermap::default();
        map.add("bob", "proj2");
        map.add("alice", "proj2");
        map.add("alice", "proj1");
        assert_eq!(map.render(), "* alice proj1,proj2\n* bob proj2\n");
    }

    #[test]
    fn merge_is_a_set_union() {
        let mut a = Usermap::default();
        a.add("alice", "proj1");
        let mut b = Usermap::default();
        b.add("alice", "proj2");
        b.add("carol", "proj1");
        a.merge(b);
        assert_eq!(a.render(), "* alice proj1,proj2\n* carol proj1\n");
    }

    #[test]
    fn parses_local_map_with_comments_and_spacing() {
        let text = "# overrides\n\n* alice proj1,proj2\n* bob proj1 proj3\nnot-a-map-line\n";
        let map = Usermap::parse_local_map(text);
        assert_eq!(map.render(), "* alice proj1,proj2\n* bob proj1,proj3\n");
    }

    #[test]
    fn retain_users_filters() {
        let mut map = Usermap::default();
        map.add("alice", "proj1");
        map.add("mallory", "proj1");
        map.retain_users(&["alice".to_string()].into());
        assert_eq!(map.render(), "* alice proj1\n");
    }

    #[test]
    fn cache_round_trip() {
        let mut map = Usermap::default();
        map.add("alice", "proj1");
        map.add("alice", "proj2");
        let flat = map.to_cache_map();
        assert_eq!(flat["alice"], "proj1,proj2");
        assert_eq!(Usermap::from_cache_map(&flat), map);
    }
}

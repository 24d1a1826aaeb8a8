//! Directory connection configuration.

/// Connection settings for the directory server.
#[derive(Clone)]
pub struct DirectoryConfig {
    /// Server URL, e.g. `ldaps://ldap.example.org`.
    pub url: String,
    /// Bind DN of the read-only service account.
    pub bind_dn: String,
    /// Bind credential.
    pub auth_token: String,
    /// Base DN the group and people subtrees hang off.
    pub base_dn: String,
}

impl DirectoryConfig {
    /// DN of the groups subtree.
    #[must_use]
    pub fn groups_dn(&self) -> String {
        format!("ou=groups,{}", self.base_dn)
    }

    /// DN of the people subtree.
    #[must_use]
    pub fn people_dn(&self) -> String {
        format!("ou=people,{}", self.base_dn)
    }
}

impl std::fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("url", &self.url)
            .field("bind_dn", &self.bind_dn)
            .field("auth_token", &"[REDACTED]")
            .field("base_dn", &self.base_dn)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DirectoryConfig {
        DirectoryConfig {
            url: "ldaps://ldap.example.org".into(),
            bind_dn: "uid=readonly,ou=system,o=Example".into(),
            auth_token: "s3cret".into(),
            base_dn: "o=Example,dc=example,dc=org".into(),
        }
    }

    #[test]
    fn subtree_dns_extend_base() {
        let cfg = config();
        assert_eq!(cfg.groups_dn(), "ou=groups,o=Example,dc=example,dc=org");
        assert_eq!(cfg.people_dn(), "ou=people,o=Example,dc=example,dc=org");
    }

    #[test]
    fn debug_redacts_auth_token() {
        let rendered = format!("{:?}", config());
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("s3cret"));
    }
}

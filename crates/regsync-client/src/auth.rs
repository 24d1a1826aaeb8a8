//! Basic-auth credentials for the registry.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::RequestBuilder;

/// An opaque `Authorization: Basic` credential.
///
/// The [`Debug`] impl redacts the token to prevent accidental credential
/// exposure in log output.
#[derive(Clone)]
pub struct BasicCredentials {
    token: String,
}

impl BasicCredentials {
    /// Build credentials from a user name and password.
    #[must_use]
    pub fn new(user: &str, password: &str) -> Self {
        let token = STANDARD.encode(format!("{user}:{password}"));
        Self { token }
    }

    /// Wrap an already-encoded Basic token.
    #[must_use]
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Attach the credential to an outbound request.
    #[must_use]
    pub fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Authorization", format!("Basic {}", self.token))
    }
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_user_colon_password() {
        let creds = BasicCredentials::new("co_7.sync", "hunter2");
        // "co_7.sync:hunter2"
        assert_eq!(creds.token, "Y29fNy5zeW5jOmh1bnRlcjI=");
    }

    #[test]
    fn debug_redacts_token() {
        let creds = BasicCredentials::new("user", "secret");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn from_token_is_passthrough() {
        let creds = BasicCredentials::from_token("abc123");
        assert_eq!(creds.token, "abc123");
    }
}

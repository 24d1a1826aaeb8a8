//! Registry credential resolution.
//!
//! The password comes from the first of: a `user:password` argument, a
//! password file, or the `PASS` environment variable.

use std::path::Path;

use regsync_client::BasicCredentials;

use crate::error::{CliError, CliResult};

pub const PASS_ENV: &str = "PASS";

/// Resolve Basic auth credentials from a `user[:password]` argument and
/// an optional password file.
pub fn resolve(user_arg: &str, password_file: Option<&Path>) -> CliResult<BasicCredentials> {
    if let Some((user, password)) = user_arg.split_once(':') {
        if user.is_empty() {
            return Err(CliError::Usage("empty user name".to_string()));
        }
        return Ok(BasicCredentials::new(user, password));
    }
    if user_arg.is_empty() {
        return Err(CliError::Usage("empty user name".to_string()));
    }

    if let Some(path) = password_file {
        let password = std::fs::read_to_string(path)?;
        return Ok(BasicCredentials::new(user_arg, password.trim_end()));
    }

    match std::env::var(PASS_ENV) {
        Ok(password) => Ok(BasicCredentials::new(user_arg, &password)),
        Err(_) => Err(CliError::PassRequired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn splits_inline_user_and_password() {
        assert!(resolve("co_7.sync:hunter2", None).is_ok());
    }

    #[test]
    fn reads_a_password_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hunter2").unwrap();
        assert!(resolve("co_7.sync", Some(file.path())).is_ok());
    }

    #[test]
    fn empty_user_is_a_usage_error() {
        assert!(matches!(resolve("", None), Err(CliError::Usage(_))));
        assert!(matches!(resolve(":pw", None), Err(CliError::Usage(_))));
    }
}

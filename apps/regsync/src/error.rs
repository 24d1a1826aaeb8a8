//! CLI error types and exit codes

use thiserror::Error;

/// Exit codes:
/// - 0: success
/// - 1: run failed or finished with failures
/// - 2: usage / credential error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("no password given: pass user:password, a password file, or set PASS")]
    PassRequired,

    #[error("invalid argument: {0}")]
    Usage(String),

    #[error(transparent)]
    Client(#[from] regsync_client::ClientError),

    #[error(transparent)]
    Engine(#[from] regsync_engine::EngineError),

    #[error(transparent)]
    Directory(#[from] regsync_directory::DirectoryError),

    #[error("run finished with {failures} failed write(s)")]
    Incomplete { failures: usize },

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::PassRequired | CliError::Usage(_) => 2,
            _ => 1,
        }
    }
}

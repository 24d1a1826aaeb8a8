//! Registry accessor error types.

use regsync_client::ClientError;
use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors surfaced by the registry accessor.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Transport or protocol failure from the underlying client.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A lookup by id returned an empty result set where exactly one
    /// record was expected.
    #[error("no such {entity}: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A name-based lookup matched more than one record.
    #[error("{count} groups found with name {name:?}")]
    Ambiguous { name: String, count: usize },
}

impl RegistryError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether the underlying failure was a transient transport problem
    /// that already exhausted its retries.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, RegistryError::Client(e) if e.is_transient())
    }
}

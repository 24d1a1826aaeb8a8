//! Engine error types.

use regsync_directory::DirectoryError;
use regsync_registry::RegistryError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the reconciliation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Registry read or write failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Directory read failure.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Cache or local map file I/O failure.
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
}

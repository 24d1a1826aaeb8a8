//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transient transport failure that survived every retry attempt.
    #[error(
        "request failed after {attempts} attempt(s) and {total_backoff_secs}s total backoff: \
         {reason} (url: {url})"
    )]
    RetriesExhausted {
        attempts: u32,
        total_backoff_secs: u64,
        reason: String,
        url: String,
    },

    /// Non-2xx HTTP response.  Never retried; the body (typically a JSON
    /// error payload) is kept for diagnostics.
    #[error("registry returned HTTP {status} for {url}: {body}")]
    Protocol {
        status: u16,
        url: String,
        body: String,
    },

    /// The request could not be sent for a reason retrying cannot fix
    /// (malformed URL, redirect loop, body build failure).
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// A 2xx response body that could not be decoded as the expected type.
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Request body serialization failure.
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// Client construction / configuration failure.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Whether the underlying failure was transient (and therefore was
    /// retried before surfacing).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::RetriesExhausted { .. })
    }

    /// HTTP status of a protocol error, if that is what this is.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }
}

//! Retrying JSON API client for the identity registry.
//!
//! The registry is reached over plain HTTPS with Basic auth.  Transient
//! transport failures (timeouts, connection resets, DNS) are absorbed here
//! with bounded exponential backoff; HTTP error statuses are never retried
//! and surface immediately with the response body attached.

pub mod auth;
pub mod client;
pub mod error;
pub mod retry;

pub use auth::BasicCredentials;
pub use client::ApiClient;
pub use error::{ClientError, ClientResult};
pub use retry::RetryPolicy;

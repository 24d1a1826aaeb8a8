//! Authenticated JSON transport with bounded retry.

use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::BasicCredentials;
use crate::error::{ClientError, ClientResult};
use crate::retry::RetryPolicy;

/// Outcome of a single request attempt.
enum Attempt {
    /// 2xx response body (empty body means "no data").
    Ok(Bytes),
    /// Transport-level failure worth retrying.
    Transient(String),
    /// Non-2xx status; surfaced immediately, never retried.
    Fatal(ClientError),
}

/// JSON API client for the registry.
///
/// Every request carries Basic auth; transient transport failures are
/// retried per the configured [`RetryPolicy`] with a sleep between
/// attempts, and HTTP error statuses surface immediately as
/// [`ClientError::Protocol`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    credentials: BasicCredentials,
    policy: RetryPolicy,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the given endpoint base URL.
    pub fn new(
        base_url: impl Into<String>,
        credentials: BasicCredentials,
        policy: RetryPolicy,
    ) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("regsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            base_url,
            credentials,
            policy,
            http,
        })
    }

    /// The configured endpoint base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a path and decode the response, `Ok(None)` on an empty body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<Option<T>> {
        let url = self.url_for(path);
        let payload = self.request_raw(Method::GET, &url, query, None).await?;
        self.decode(&url, payload)
    }

    /// Send a JSON body and decode the response, `Ok(None)` on an empty body.
    pub async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<Option<T>> {
        let url = self.url_for(path);
        let encoded = serde_json::to_vec(body)?;
        let payload = self
            .request_raw(method, &url, &[], Some(encoded))
            .await?;
        self.decode(&url, payload)
    }

    /// Send a bodyless non-GET request, discarding any response payload.
    pub async fn send_empty(&self, method: Method, path: &str) -> ClientResult<()> {
        let url = self.url_for(path);
        self.request_raw(method, &url, &[], None).await?;
        Ok(())
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn decode<T: DeserializeOwned>(
        &self,
        url: &str,
        payload: Option<Bytes>,
    ) -> ClientResult<Option<T>> {
        match payload {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| ClientError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                }),
        }
    }

    /// Issue the request with retry, returning the raw response body
    /// (`None` when the body is empty).
    async fn request_raw(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<Vec<u8>>,
    ) -> ClientResult<Option<Bytes>> {
        let mut attempt: u32 = 0;
        let mut total_backoff_secs: u64 = 0;

        loop {
            match self
                .attempt_once(method.clone(), url, query, body.as_deref(), attempt)
                .await
            {
                Attempt::Ok(bytes) => {
                    if attempt > 0 {
                        debug!(url, attempt = attempt + 1, "request succeeded after retries");
                    }
                    return Ok(if bytes.is_empty() { None } else { Some(bytes) });
                }
                Attempt::Fatal(err) => return Err(err),
                Attempt::Transient(reason) => {
                    if !self.policy.should_retry(attempt) {
                        warn!(
                            url,
                            attempts = attempt + 1,
                            total_backoff_secs,
                            reason,
                            "retries exhausted"
                        );
                        return Err(ClientError::RetriesExhausted {
                            attempts: attempt + 1,
                            total_backoff_secs,
                            reason,
                            url: url.to_string(),
                        });
                    }

                    let delay = self.policy.delay_for(attempt);
                    debug!(
                        url,
                        attempt = attempt + 1,
                        delay_secs = delay.as_secs(),
                        reason,
                        "retrying after transient transport failure"
                    );
                    tokio::time::sleep(delay).await;
                    total_backoff_secs += delay.as_secs();
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt_once(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&[u8]>,
        attempt: u32,
    ) -> Attempt {
        let mut builder = self
            .http
            .request(method, url)
            .timeout(self.policy.timeout_for(attempt));
        if !query.is_empty() {
            builder = builder.query(query);
        }
        builder = self.credentials.apply(builder);
        if let Some(bytes) = body {
            builder = builder
                .header("Content-Type", "application/json")
                .body(bytes.to_vec());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            // Timeouts, DNS failures, and connection resets are worth
            // retrying; builder and redirect errors repeat identically
            // on every attempt.
            Err(err)
                if (err.is_timeout() || err.is_connect() || err.is_request())
                    && !err.is_redirect()
                    && !err.is_builder() =>
            {
                return Attempt::Transient(err.to_string())
            }
            Err(err) => {
                return Attempt::Fatal(ClientError::Request {
                    url: url.to_string(),
                    message: err.to_string(),
                })
            }
        };

        let status = response.status();
        if status.is_success() {
            match response.bytes().await {
                Ok(bytes) => Attempt::Ok(bytes),
                Err(err) => Attempt::Transient(format!("response read failed: {err}")),
            }
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            Attempt::Fatal(ClientError::Protocol {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            })
        }
    }
}

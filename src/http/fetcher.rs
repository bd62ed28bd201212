use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::error;

use crate::error::{FetchError, HttpError};

/// One fully resolved GET, ready to hand to a [`Fetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub index: usize,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

/// What the executor needs from a completed HTTP exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub bytes: u64,
}

/// Performs a GET and reads the full body.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`FetchError`] for any transport-level failure.
    async fn fetch(&self, request: &OutboundRequest) -> Result<FetchResponse, FetchError>;
}

/// Hands out one connection pool per round.
pub trait Transport: Send + Sync {
    /// Opens a session whose pool is sized for `pool_size` concurrent requests.
    /// The pool is released when the returned fetcher is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying client cannot be built.
    fn open_session(&self, pool_size: usize) -> Result<Arc<dyn Fetcher>, HttpError>;
}

/// [`Transport`] backed by a fresh `reqwest` client per session.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    timeout: Duration,
}

impl ReqwestTransport {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Transport for ReqwestTransport {
    fn open_session(&self, pool_size: usize) -> Result<Arc<dyn Fetcher>, HttpError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(pool_size)
            .build()
            .map_err(|err| {
                error!("Failed to build HTTP client: {}", err);
                HttpError::BuildClientFailed { source: err }
            })?;
        Ok(Arc::new(ReqwestSession { client }))
    }
}

struct ReqwestSession {
    client: Client,
}

#[async_trait]
impl Fetcher for ReqwestSession {
    async fn fetch(&self, request: &OutboundRequest) -> Result<FetchResponse, FetchError> {
        let mut builder = self.client.get(&request.url).timeout(request.timeout);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(FetchResponse {
            status,
            bytes: u64::try_from(body.len()).unwrap_or(u64::MAX),
        })
    }
}

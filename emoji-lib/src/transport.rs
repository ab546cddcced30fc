//! HTTP transport abstraction

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ETAG;
use url::Url;

use crate::error::ApiError;

/// A raw HTTP response.
///
/// Non-success statuses are returned as values; only failures to complete
/// the exchange are errors.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// `ETag` header, if present.
    pub etag: Option<String>,
    /// Response body (empty for `HEAD`).
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport used to reach the emoji data host.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a `GET` request.
    async fn get(&self, url: &Url) -> Result<HttpResponse, ApiError>;

    /// Performs a `HEAD` request.
    async fn head(&self, url: &Url) -> Result<HttpResponse, ApiError>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestTransport {
    /// Creates a transport with a default client.
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Creates a transport around a custom client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<HttpResponse, ApiError> {
        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, etag, body })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, ApiError> {
        log::trace!("[emoji-data] GET {url}");
        self.send(self.client.get(url.clone())).await
    }

    async fn head(&self, url: &Url) -> Result<HttpResponse, ApiError> {
        log::trace!("[emoji-data] HEAD {url}");
        self.send(self.client.head(url.clone())).await
    }
}

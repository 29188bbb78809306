//! HTTP transport capability and its reqwest implementation.

use std::fmt;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::TransportError;

/// Opaque authorization handed to every request.
///
/// The core never inspects or refreshes it; `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Raw status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network capability used by the accessor.
///
/// Implementations return `Err` only when no response was received; any
/// status code, including errors, comes back as an [`HttpResponse`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, credential: &Credential) -> Result<HttpResponse, TransportError>;

    async fn post_json(
        &self,
        url: &str,
        credential: &Credential,
        body: &Value,
    ) -> Result<HttpResponse, TransportError>;

    async fn delete(
        &self,
        url: &str,
        credential: &Credential,
    ) -> Result<HttpResponse, TransportError>;
}

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn request(
        &self,
        method: Method,
        url: &str,
        credential: &Credential,
    ) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(credential.token())
            .header("Accept", "application/json")
            .header("User-Agent", concat!("giam/", env!("CARGO_PKG_VERSION")))
    }

    async fn send(url: &str, req: reqwest::RequestBuilder) -> Result<HttpResponse, TransportError> {
        let resp = req
            .send()
            .await
            .map_err(|e| TransportError::request(url, e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::request(url, e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, credential: &Credential) -> Result<HttpResponse, TransportError> {
        Self::send(url, self.request(Method::GET, url, credential)).await
    }

    async fn post_json(
        &self,
        url: &str,
        credential: &Credential,
        body: &Value,
    ) -> Result<HttpResponse, TransportError> {
        let req = self
            .request(Method::POST, url, credential)
            .header("Content-Type", "application/json")
            .json(body);
        Self::send(url, req).await
    }

    async fn delete(
        &self,
        url: &str,
        credential: &Credential,
    ) -> Result<HttpResponse, TransportError> {
        Self::send(url, self.request(Method::DELETE, url, credential)).await
    }
}

//! Transport seam
//!
//! The executor talks to the service through [`Transport`] so that the
//! long-running-operation logic can be driven by canned responses in tests.
//! [`HttpTransport`] is the production implementation on top of reqwest.

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::Result;

/// Status, `Location` header and raw body of one HTTP exchange
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl RawResponse {
    /// Response carrying a JSON body
    pub fn json(status: StatusCode, body: &JsonValue) -> Self {
        Self {
            status,
            location: None,
            body: body.to_string(),
        }
    }

    /// Response with an empty body
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            location: None,
            body: String::new(),
        }
    }

    /// Sets the `Location` header
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Sends a single request and returns the raw response
///
/// `target` is either a path relative to the service base URL or an absolute
/// URL, as handed out in `Location` headers.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: Method,
        target: &str,
        body: Option<&JsonValue>,
    ) -> Result<RawResponse>;
}

/// reqwest-backed transport with bearer authentication
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Base URL of the service (e.g., "https://api.fabric.microsoft.com")
    base_url: String,
    /// Bearer token sent with every request
    access_token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl HttpTransport {
    /// Create a transport for `base_url`
    pub fn new(base_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self::with_client(base_url, access_token, Client::new())
    }

    /// Create a transport with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        access_token: Option<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            client,
        }
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves a request target to a full URL
    pub fn resolve(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!("{}/{}", self.base_url, target.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        target: &str,
        body: Option<&JsonValue>,
    ) -> Result<RawResponse> {
        let url = self.resolve(target);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            location,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_trims_trailing_slash() {
        let transport = HttpTransport::new("https://api.example.com/", None);
        assert_eq!(transport.base_url(), "https://api.example.com");
    }

    #[test]
    fn test_resolve_relative_path() {
        let transport = HttpTransport::new("https://api.example.com", None);
        assert_eq!(
            transport.resolve("v1/workspaces"),
            "https://api.example.com/v1/workspaces"
        );
        assert_eq!(
            transport.resolve("/v1/workspaces"),
            "https://api.example.com/v1/workspaces"
        );
    }

    #[test]
    fn test_resolve_keeps_absolute_url() {
        let transport = HttpTransport::new("https://api.example.com", None);
        let location = "https://wabi.example.net/v1/operations/42";
        assert_eq!(transport.resolve(location), location);
    }
}

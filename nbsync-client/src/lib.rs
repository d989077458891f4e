//! nbsync Workspace Client
//!
//! A small, typed client for the workspace REST service that hosts module
//! notebooks.
//!
//! It provides:
//! - A [`Transport`] seam with a reqwest implementation ([`HttpTransport`])
//! - The long-running-operation executor ([`WorkspaceClient::execute`])
//! - Notebook and folder listing plus definition retrieval
//!
//! # Example
//!
//! ```no_run
//! use nbsync_client::WorkspaceClient;
//! use nbsync_core::WorkspaceContext;
//!
//! # async fn example() -> nbsync_client::Result<()> {
//! let client = WorkspaceClient::new(
//!     "https://api.fabric.microsoft.com",
//!     Some("token".to_string()),
//!     WorkspaceContext::new("Sales", "6f1c0000-0000-0000-0000-000000000000"),
//! );
//!
//! let modules = client.list_module_resources(Some(&["lib".to_string()])).await?;
//! println!("{} module notebook(s)", modules.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
mod items;
mod lro;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use items::definition_path;
pub use lro::DEFAULT_POLL_INTERVAL;
pub use transport::{HttpTransport, RawResponse, Transport};

use nbsync_core::WorkspaceContext;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

/// Client for one workspace of the remote service
///
/// Cheap to clone: the transport is shared.
#[derive(Clone)]
pub struct WorkspaceClient {
    /// Transport used for every request
    transport: Arc<dyn Transport>,
    /// Workspace all paths are scoped to
    workspace: WorkspaceContext,
    /// Sleep between two polls of a long-running operation
    poll_interval: Duration,
}

impl WorkspaceClient {
    /// Create a client talking HTTP to `base_url`
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the service (e.g., "https://api.fabric.microsoft.com")
    /// * `access_token` - Bearer token, if the service requires one
    /// * `workspace` - Workspace the client is scoped to
    pub fn new(
        base_url: impl Into<String>,
        access_token: Option<String>,
        workspace: WorkspaceContext,
    ) -> Self {
        Self::with_transport(
            Arc::new(HttpTransport::new(base_url, access_token)),
            workspace,
        )
    }

    /// Create a client on top of a custom transport
    pub fn with_transport(transport: Arc<dyn Transport>, workspace: WorkspaceContext) -> Self {
        Self {
            transport,
            workspace,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the interval between long-running-operation polls
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Get the workspace this client is scoped to
    pub fn workspace(&self) -> &WorkspaceContext {
        &self.workspace
    }

    /// Get the configured poll interval
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Checks the status code and parses the body as JSON
    ///
    /// An empty body parses to `null`.
    fn handle_response(response: RawResponse) -> Result<JsonValue> {
        if !response.status.is_success() {
            let message = if response.body.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                response.body
            };
            return Err(ClientError::api_error(response.status.as_u16(), message));
        }

        if response.body.trim().is_empty() {
            return Ok(JsonValue::Null);
        }

        serde_json::from_str(&response.body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    fn workspace() -> WorkspaceContext {
        WorkspaceContext::new("Sales", "W1")
    }

    #[test]
    fn test_client_creation() {
        let client = WorkspaceClient::new("https://api.example.com", None, workspace());
        assert_eq!(client.workspace().id, "W1");
        assert_eq!(client.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_client_with_poll_interval() {
        let client = WorkspaceClient::new("https://api.example.com", None, workspace())
            .with_poll_interval(Duration::from_millis(250));
        assert_eq!(client.poll_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_handle_response_parses_json() {
        let response = RawResponse::json(StatusCode::OK, &json!({ "value": [] }));
        let value = WorkspaceClient::handle_response(response).unwrap();
        assert_eq!(value, json!({ "value": [] }));
    }

    #[test]
    fn test_handle_response_empty_body_is_null() {
        let value = WorkspaceClient::handle_response(RawResponse::empty(StatusCode::OK)).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_handle_response_error_status() {
        let response = RawResponse::json(
            StatusCode::NOT_FOUND,
            &json!({ "errorCode": "ItemNotFound" }),
        );
        let err = WorkspaceClient::handle_response(response).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("ItemNotFound"));
    }

    #[test]
    fn test_handle_response_invalid_json() {
        let response = RawResponse {
            status: StatusCode::OK,
            location: None,
            body: "<html>".to_string(),
        };
        let err = WorkspaceClient::handle_response(response).unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
    }
}

//! Fetch service
//!
//! Retrieves one notebook's definition, extracts its source part and writes it
//! to the scratch directory as `<display name>.py`.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use nbsync_client::{ClientError, WorkspaceClient};
use nbsync_core::domain::definition::NOTEBOOK_CONTENT_PREFIX;
use nbsync_core::{DefinitionResponse, Resource};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while fetching a single notebook
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Failed to get notebook definition for {name}, status: {status}, response: {response}")]
    DefinitionFailed {
        name: String,
        status: String,
        response: JsonValue,
    },

    #[error("Malformed definition for {name}: {message}")]
    Malformed { name: String, message: String },

    #[error("Definition of {name} has no part starting with 'notebook-content'")]
    MissingContentPart { name: String },

    #[error("'{name}' cannot be used as a module file name")]
    InvalidName { name: String },

    #[error("Payload of {name} is not valid base64: {source}")]
    Decode {
        name: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Payload of {name} is not valid UTF-8: {source}")]
    Utf8 {
        name: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Service trait for materialising one notebook
#[async_trait]
pub trait FetchService: Send + Sync {
    /// Fetches `resource` and writes it into `scratch_dir`
    ///
    /// # Returns
    /// Path of the written file
    async fn fetch_to_scratch(
        &self,
        resource: &Resource,
        scratch_dir: &Path,
    ) -> Result<PathBuf, FetchError>;
}

/// Fetch service backed by the workspace client
pub struct StandardFetchService {
    client: Arc<WorkspaceClient>,
}

impl StandardFetchService {
    pub fn new(client: Arc<WorkspaceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FetchService for StandardFetchService {
    async fn fetch_to_scratch(
        &self,
        resource: &Resource,
        scratch_dir: &Path,
    ) -> Result<PathBuf, FetchError> {
        let name = &resource.display_name;
        validate_module_name(name)?;

        debug!("Fetching definition of '{}' ({})", name, resource.id);
        let response = self.client.get_definition(&resource.id).await?;
        let source = extract_source(name, response)?;

        // Not atomic: a torn file is wiped by the next reset
        let path = scratch_dir.join(format!("{}.py", name));
        tokio::fs::write(&path, source)
            .await
            .map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            })?;

        info!("Fetched module '{}' to {}", name, path.display());
        Ok(path)
    }
}

/// Extracts the notebook source from a raw definition response
///
/// The first part whose path starts with `notebook-content` wins.
pub fn extract_source(name: &str, response: JsonValue) -> Result<String, FetchError> {
    let definition: DefinitionResponse =
        serde_json::from_value(response.clone()).map_err(|e| FetchError::Malformed {
            name: name.to_string(),
            message: e.to_string(),
        })?;

    if definition.is_failed() {
        return Err(FetchError::DefinitionFailed {
            name: name.to_string(),
            status: "Failed".to_string(),
            response,
        });
    }

    let part = definition
        .first_part(NOTEBOOK_CONTENT_PREFIX)
        .ok_or_else(|| FetchError::MissingContentPart {
            name: name.to_string(),
        })?;

    debug!("Using part '{}' of '{}'", part.path, name);

    let bytes = STANDARD
        .decode(part.payload.trim())
        .map_err(|source| FetchError::Decode {
            name: name.to_string(),
            source,
        })?;

    String::from_utf8(bytes).map_err(|source| FetchError::Utf8 {
        name: name.to_string(),
        source,
    })
}

/// Rejects display names that would escape the scratch directory
pub fn validate_module_name(name: &str) -> Result<(), FetchError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(FetchError::InvalidName {
            name: name.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbsync_client::testing::ScriptedTransport;
    use nbsync_client::{RawResponse, definition_path};
    use nbsync_core::WorkspaceContext;
    use reqwest::{Method, StatusCode};
    use serde_json::json;
    use std::time::Duration;

    fn definition(parts: JsonValue) -> JsonValue {
        json!({ "definition": { "format": "fabricGitSource", "parts": parts } })
    }

    fn resource(name: &str, id: &str) -> Resource {
        Resource {
            display_name: name.to_string(),
            id: id.to_string(),
            folder_id: Some("F1".to_string()),
        }
    }

    #[test]
    fn test_extract_source_decodes_payload() {
        let response = definition(json!([
            { "path": ".platform", "payload": "e30=" },
            { "path": "notebook-content.py", "payload": "cHJpbnQoMSk=" }
        ]));

        assert_eq!(extract_source("Utils", response).unwrap(), "print(1)");
    }

    #[test]
    fn test_extract_source_takes_first_match() {
        // "aGVsbG8=" is "hello", "d29ybGQ=" is "world"
        let response = definition(json!([
            { "path": "notebook-content.py", "payload": "aGVsbG8=" },
            { "path": "notebook-content.sql", "payload": "d29ybGQ=" }
        ]));

        assert_eq!(extract_source("Utils", response).unwrap(), "hello");
    }

    #[test]
    fn test_extract_source_failed_status() {
        let response = json!({ "status": "Failed", "error": { "errorCode": "Timeout" } });

        let err = extract_source("Utils", response).unwrap_err();

        assert!(matches!(err, FetchError::DefinitionFailed { .. }));
        let message = err.to_string();
        assert!(message.contains("Utils"));
        assert!(message.contains("status: Failed"));
        assert!(message.contains("Timeout"));
    }

    #[test]
    fn test_extract_source_missing_part() {
        let response = definition(json!([{ "path": ".platform", "payload": "e30=" }]));

        let err = extract_source("Utils", response).unwrap_err();

        assert!(matches!(err, FetchError::MissingContentPart { ref name } if name == "Utils"));
    }

    #[test]
    fn test_extract_source_without_definition() {
        let err = extract_source("Utils", json!({ "status": "Succeeded" })).unwrap_err();
        assert!(matches!(err, FetchError::MissingContentPart { .. }));
    }

    #[test]
    fn test_extract_source_bad_base64() {
        let response = definition(json!([{ "path": "notebook-content.py", "payload": "%%%" }]));

        let err = extract_source("Utils", response).unwrap_err();

        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn test_extract_source_bad_utf8() {
        // 0xFF 0xFE
        let response = definition(json!([{ "path": "notebook-content.py", "payload": "//4=" }]));

        let err = extract_source("Utils", response).unwrap_err();

        assert!(matches!(err, FetchError::Utf8 { .. }));
    }

    #[test]
    fn test_validate_module_name() {
        assert!(validate_module_name("Utils").is_ok());
        assert!(validate_module_name("data_helpers v2").is_ok());
        assert!(validate_module_name("").is_err());
        assert!(validate_module_name("..").is_err());
        assert!(validate_module_name("../escape").is_err());
        assert!(validate_module_name("nested\\name").is_err());
    }

    #[tokio::test]
    async fn test_fetch_to_scratch_writes_file() {
        let scratch = tempfile::tempdir().unwrap();
        let transport = Arc::new(ScriptedTransport::new());
        let operation = "https://api.example.com/v1/operations/op1";
        transport.respond(
            Method::POST,
            definition_path("W1", "N1"),
            RawResponse::empty(StatusCode::ACCEPTED).with_location(operation),
        );
        transport.respond(
            Method::GET,
            operation,
            RawResponse::empty(StatusCode::OK).with_location(format!("{}/result", operation)),
        );
        transport.respond_json(
            Method::GET,
            format!("{}/result", operation),
            definition(json!([{ "path": "notebook-content.py", "payload": "cHJpbnQoMSk=" }])),
        );
        let client = WorkspaceClient::with_transport(transport, WorkspaceContext::new("Sales", "W1"))
            .with_poll_interval(Duration::from_millis(1));
        let service = StandardFetchService::new(Arc::new(client));

        let path = service
            .fetch_to_scratch(&resource("Utils", "N1"), scratch.path())
            .await
            .unwrap();

        assert_eq!(path, scratch.path().join("Utils.py"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "print(1)");
    }

    #[tokio::test]
    async fn test_fetch_to_scratch_rejects_name_before_io() {
        let scratch = tempfile::tempdir().unwrap();
        let transport = Arc::new(ScriptedTransport::new());
        let client =
            WorkspaceClient::with_transport(transport.clone(), WorkspaceContext::new("Sales", "W1"));
        let service = StandardFetchService::new(Arc::new(client));

        let err = service
            .fetch_to_scratch(&resource("../evil", "N9"), scratch.path())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::InvalidName { .. }));
        assert!(transport.requests().is_empty());
    }
}

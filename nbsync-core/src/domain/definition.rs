//! Item definitions
//!
//! A definition is the exported form of an item: a list of parts, each with a
//! path and a base64 payload. Definitions come back either directly or as the
//! result of a long-running operation, in which case a `status` may be present.

use serde::{Deserialize, Serialize};

/// Path prefix of the part holding a notebook's source
pub const NOTEBOOK_CONTENT_PREFIX: &str = "notebook-content";

/// Response body of a definition request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionResponse {
    #[serde(default)]
    pub status: Option<OperationStatus>,

    #[serde(default)]
    pub definition: Option<ItemDefinition>,
}

impl DefinitionResponse {
    /// Whether the operation that produced this response reported failure
    pub fn is_failed(&self) -> bool {
        self.status == Some(OperationStatus::Failed)
    }

    /// Returns the first part whose path starts with `prefix`
    pub fn first_part(&self, prefix: &str) -> Option<&DefinitionPart> {
        self.definition
            .as_ref()?
            .parts
            .iter()
            .find(|part| part.path.starts_with(prefix))
    }
}

/// Exported definition of an item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemDefinition {
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub parts: Vec<DefinitionPart>,
}

/// One file of an item definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionPart {
    pub path: String,

    /// Base64 encoded content
    pub payload: String,

    #[serde(default)]
    pub payload_type: Option<String>,
}

/// State of a long-running operation as reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    #[serde(other)]
    Undefined,
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationStatus::NotStarted => write!(f, "NotStarted"),
            OperationStatus::Running => write!(f, "Running"),
            OperationStatus::Succeeded => write!(f, "Succeeded"),
            OperationStatus::Failed => write!(f, "Failed"),
            OperationStatus::Undefined => write!(f, "Undefined"),
        }
    }
}

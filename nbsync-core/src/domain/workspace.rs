//! Workspace identity

use serde::{Deserialize, Serialize};

/// Identity of the workspace a refresh runs against
///
/// The name keys the local scratch directory, the id is used in API paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceContext {
    /// Display name of the workspace
    pub name: String,

    /// Opaque workspace identifier
    pub id: String,
}

impl WorkspaceContext {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

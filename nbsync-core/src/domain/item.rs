//! Workspace items and folders

use serde::{Deserialize, Serialize};

/// A notebook item that may be materialised as an importable module
///
/// The display name doubles as file stem and module name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub display_name: String,

    pub id: String,

    /// Folder the item lives in, `None` for the workspace root
    #[serde(default)]
    pub folder_id: Option<String>,
}

/// A logical folder inside a workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub display_name: String,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_from_service_json() {
        let json = serde_json::json!({
            "id": "N1",
            "type": "Notebook",
            "displayName": "Utils",
            "description": "",
            "workspaceId": "W1",
            "folderId": "F1"
        });

        let resource: Resource = serde_json::from_value(json).unwrap();
        assert_eq!(resource.display_name, "Utils");
        assert_eq!(resource.id, "N1");
        assert_eq!(resource.folder_id.as_deref(), Some("F1"));
    }

    #[test]
    fn test_resource_without_folder() {
        let json = serde_json::json!({ "id": "N2", "displayName": "Root" });

        let resource: Resource = serde_json::from_value(json).unwrap();
        assert_eq!(resource.folder_id, None);
    }
}

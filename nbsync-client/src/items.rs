//! Item-related API endpoints

use nbsync_core::dto::ListResponse;
use nbsync_core::{Folder, Resource};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use tracing::debug;

use crate::WorkspaceClient;
use crate::error::{ClientError, Result};

impl WorkspaceClient {
    // =============================================================================
    // Listing
    // =============================================================================

    /// List all notebook items of the workspace
    pub async fn list_notebooks(&self) -> Result<Vec<Resource>> {
        let path = format!("v1/workspaces/{}/items?type=Notebook", self.workspace.id);
        let value = self.execute(Method::GET, &path, None).await?;

        Ok(parse::<ListResponse<Resource>>(value, "notebook list")?.value)
    }

    /// List all folders of the workspace
    pub async fn list_folders(&self) -> Result<Vec<Folder>> {
        let path = format!("v1/workspaces/{}/folders", self.workspace.id);
        let value = self.execute(Method::GET, &path, None).await?;

        Ok(parse::<ListResponse<Folder>>(value, "folder list")?.value)
    }

    /// List the notebooks that should be materialised as modules
    ///
    /// # Arguments
    /// * `folder_filter` - Display names of the folders to keep notebooks from.
    ///   `None` keeps every notebook, including those outside any folder.
    ///
    /// # Returns
    /// Matching notebooks in the order the service returned them
    pub async fn list_module_resources(
        &self,
        folder_filter: Option<&[String]>,
    ) -> Result<Vec<Resource>> {
        let notebooks = self.list_notebooks().await?;

        let Some(filter) = folder_filter else {
            debug!("No folder filter, keeping all {} notebook(s)", notebooks.len());
            return Ok(notebooks);
        };

        let folder_ids: HashSet<String> = self
            .list_folders()
            .await?
            .into_iter()
            .filter(|folder| filter.contains(&folder.display_name))
            .map(|folder| folder.id)
            .collect();

        let matching: Vec<Resource> = notebooks
            .into_iter()
            .filter(|notebook| {
                notebook
                    .folder_id
                    .as_ref()
                    .is_some_and(|id| folder_ids.contains(id))
            })
            .collect();

        debug!(
            "{} notebook(s) in folder(s) {:?}",
            matching.len(),
            filter
        );

        Ok(matching)
    }

    // =============================================================================
    // Definitions
    // =============================================================================

    /// Get an item's definition in source-control format
    ///
    /// The raw JSON is returned so callers can report the full response when
    /// the operation failed.
    pub async fn get_definition(&self, item_id: &str) -> Result<JsonValue> {
        let path = definition_path(&self.workspace.id, item_id);
        self.execute(Method::POST, &path, None).await
    }
}

/// Path of the definition export endpoint for one item
pub fn definition_path(workspace_id: &str, item_id: &str) -> String {
    format!(
        "v1/workspaces/{}/items/{}/getDefinition?format=fabricGitSource",
        workspace_id, item_id
    )
}

fn parse<T: DeserializeOwned>(value: JsonValue, what: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| ClientError::ParseError(format!("Failed to parse {}: {}", what, e)))
}

//! Refresher configuration
//!
//! Connection settings for the workspace service plus the knobs of a refresh
//! cycle: where the scratch directory lives, how often operations are polled
//! and how many notebooks are fetched at once.

use nbsync_client::{DEFAULT_POLL_INTERVAL, WorkspaceClient};
use nbsync_core::WorkspaceContext;
use std::path::PathBuf;
use std::time::Duration;

use crate::scheduler::refresher::DEFAULT_MAX_PARALLEL_FETCHES;
use crate::service::scratch_path;

/// Default base URL of the workspace service
pub const DEFAULT_API_URL: &str = "https://api.fabric.microsoft.com";

/// Refresher configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the workspace service
    pub api_base_url: String,

    /// Bearer token sent with every request
    pub access_token: Option<String>,

    /// Workspace to refresh
    pub workspace: WorkspaceContext,

    /// Directory below which `python_modules/<workspace>` is created
    pub temp_root: PathBuf,

    /// Sleep between two polls of a long-running operation
    pub poll_interval: Duration,

    /// Number of notebooks fetched concurrently
    pub max_parallel_fetches: usize,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(workspace: WorkspaceContext) -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            access_token: None,
            workspace,
            temp_root: std::env::temp_dir(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_parallel_fetches: DEFAULT_MAX_PARALLEL_FETCHES,
        }
    }

    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token;
        self
    }

    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = temp_root.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_parallel_fetches(mut self, max_parallel_fetches: usize) -> Self {
        self.max_parallel_fetches = max_parallel_fetches;
        self
    }

    /// Scratch directory of the configured workspace
    pub fn scratch_dir(&self) -> PathBuf {
        scratch_path(&self.temp_root, &self.workspace.name)
    }

    /// Builds a client for the configured workspace
    pub fn client(&self) -> WorkspaceClient {
        WorkspaceClient::new(
            self.api_base_url.clone(),
            self.access_token.clone(),
            self.workspace.clone(),
        )
        .with_poll_interval(self.poll_interval)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workspace.id.is_empty() {
            anyhow::bail!("workspace id cannot be empty");
        }

        validate_workspace_name(&self.workspace.name)?;

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            anyhow::bail!("api_base_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.max_parallel_fetches == 0 {
            anyhow::bail!("max_parallel_fetches must be greater than 0");
        }

        Ok(())
    }
}

/// Rejects workspace names that cannot be a single directory component
pub fn validate_workspace_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        anyhow::bail!("workspace name '{}' cannot be used as a directory name", name);
    }
    Ok(())
}

//! Configuration module
//!
//! Global connection options, read from flags or the environment, and their
//! conversion into the refresher configuration.

use anyhow::{Context, Result};
use clap::Args;
use nbsync_core::WorkspaceContext;
use nbsync_refresher::Config;
use nbsync_refresher::config::{DEFAULT_API_URL, validate_workspace_name};
use nbsync_refresher::service::scratch_path;
use std::path::PathBuf;
use std::time::Duration;

/// Options shared by every command
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Base URL of the workspace service
    #[arg(long, env = "NBSYNC_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Bearer token for the workspace service
    #[arg(long, env = "NBSYNC_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Display name of the workspace (keys the scratch directory)
    #[arg(long, env = "NBSYNC_WORKSPACE_NAME", global = true)]
    pub workspace_name: Option<String>,

    /// Identifier of the workspace
    #[arg(long, env = "NBSYNC_WORKSPACE_ID", global = true)]
    pub workspace_id: Option<String>,

    /// Root below which python_modules/<workspace> is created [default: system temp dir]
    #[arg(long, env = "NBSYNC_TEMP_ROOT", global = true)]
    pub temp_root: Option<PathBuf>,

    /// Seconds between two polls of a long-running operation
    #[arg(long, env = "NBSYNC_POLL_INTERVAL", default_value = "1", global = true)]
    pub poll_interval: u64,

    /// Number of notebooks fetched concurrently
    #[arg(long, env = "NBSYNC_MAX_PARALLEL", default_value = "5", global = true)]
    pub parallel: usize,
}

impl ConnectionArgs {
    /// Scratch directory of the workspace
    ///
    /// Needs only the workspace name and temp root, no service connection.
    pub fn scratch_dir(&self) -> Result<PathBuf> {
        let name = self
            .workspace_name
            .as_deref()
            .context("workspace name not set (use --workspace-name or NBSYNC_WORKSPACE_NAME)")?;
        validate_workspace_name(name)?;

        let temp_root = self.temp_root.clone().unwrap_or_else(std::env::temp_dir);
        Ok(scratch_path(&temp_root, name))
    }

    /// Builds and validates the refresher configuration
    pub fn into_config(self) -> Result<Config> {
        let name = self
            .workspace_name
            .context("workspace name not set (use --workspace-name or NBSYNC_WORKSPACE_NAME)")?;
        let id = self
            .workspace_id
            .context("workspace id not set (use --workspace-id or NBSYNC_WORKSPACE_ID)")?;

        let mut config = Config::new(WorkspaceContext::new(name, id))
            .with_api_base_url(self.api_url)
            .with_access_token(self.token)
            .with_poll_interval(Duration::from_secs(self.poll_interval))
            .with_max_parallel_fetches(self.parallel);

        if let Some(temp_root) = self.temp_root {
            config = config.with_temp_root(temp_root);
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

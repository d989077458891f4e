//! Module refresher
//!
//! Refreshes the module notebooks of one workspace. Fetches run as tasks on a
//! `JoinSet`, each holding a semaphore permit so at most
//! `max_parallel_fetches` run at once. Outcomes are consumed in completion
//! order and the first failure ends the cycle; dropping the set aborts the
//! fetches still in flight.

use chrono::{DateTime, Utc};
use nbsync_client::{ClientError, WorkspaceClient};
use nbsync_core::Resource;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{AcquireError, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::service::{FetchError, FetchService, ModuleCache, ModuleCacheError, StandardFetchService};

/// Default width of the fetch pool
pub const DEFAULT_MAX_PARALLEL_FETCHES: usize = 5;

/// Folder searched when the caller does not name one
pub const DEFAULT_FOLDER: &str = "lib";

/// Errors that abort a refresh cycle
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Failed to reset scratch directory: {0}")]
    Cache(#[from] ModuleCacheError),

    #[error("Failed to list module notebooks: {0}")]
    List(#[from] ClientError),

    #[error("'{name}' generated an exception: {source}")]
    Fetch {
        name: String,
        #[source]
        source: FetchError,
    },

    #[error("Fetch pool closed: {0}")]
    PoolClosed(#[from] AcquireError),

    #[error("Fetch task panicked: {0}")]
    TaskPanicked(String),
}

/// What to refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOptions {
    /// Folder display names to take notebooks from, `None` for all notebooks
    pub folders: Option<Vec<String>>,

    /// Display names that are never fetched
    pub exclude: Vec<String>,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            folders: Some(vec![DEFAULT_FOLDER.to_string()]),
            exclude: Vec::new(),
        }
    }
}

impl RefreshOptions {
    /// Options taking notebooks from every folder and the workspace root
    pub fn all_folders() -> Self {
        Self {
            folders: None,
            exclude: Vec::new(),
        }
    }

    pub fn with_folders(mut self, folders: Vec<String>) -> Self {
        self.folders = Some(folders);
        self
    }

    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }
}

/// Outcome of a successful refresh
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub workspace: String,
    pub scratch_dir: PathBuf,
    /// Every notebook the listing returned, excluded ones included
    pub candidates: Vec<String>,
    /// Fetched notebooks in completion order
    pub fetched: Vec<String>,
    pub excluded: Vec<String>,
    /// Registry entries dropped after the fetch
    pub evicted: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl RefreshReport {
    pub fn duration(&self) -> chrono::TimeDelta {
        self.completed_at - self.started_at
    }
}

/// Runs refresh cycles for one workspace
pub struct ModuleRefresher {
    client: Arc<WorkspaceClient>,
    fetcher: Arc<dyn FetchService>,
    cache: Arc<dyn ModuleCache>,
    max_parallel_fetches: usize,
}

impl ModuleRefresher {
    /// Creates a refresher fetching through `client` into `cache`
    pub fn new(client: Arc<WorkspaceClient>, cache: Arc<dyn ModuleCache>) -> Self {
        let fetcher = Arc::new(StandardFetchService::new(Arc::clone(&client)));
        Self {
            client,
            fetcher,
            cache,
            max_parallel_fetches: DEFAULT_MAX_PARALLEL_FETCHES,
        }
    }

    /// Replaces the fetch service
    pub fn with_fetcher(mut self, fetcher: Arc<dyn FetchService>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Sets the fetch pool width (at least 1)
    pub fn with_max_parallel_fetches(mut self, max_parallel_fetches: usize) -> Self {
        self.max_parallel_fetches = max_parallel_fetches.max(1);
        self
    }

    /// Refreshes the module notebooks selected by `options`
    ///
    /// Either every selected notebook is written and the module state updated,
    /// or the first error is returned and the search path and registry are
    /// left untouched. The scratch directory is reset in both cases.
    pub async fn refresh(&self, options: RefreshOptions) -> Result<RefreshReport, RefreshError> {
        let started_at = Utc::now();
        let workspace = self.client.workspace().name.clone();
        let scratch_dir = self.cache.scratch_dir().to_path_buf();

        info!(
            "Refreshing module notebooks of '{}' into {}",
            workspace,
            scratch_dir.display()
        );

        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || cache.reset())
            .await
            .map_err(|e| RefreshError::TaskPanicked(e.to_string()))??;

        let exclude: HashSet<String> = options.exclude.into_iter().collect();
        let candidates = self
            .client
            .list_module_resources(options.folders.as_deref())
            .await?;

        let (excluded, selected): (Vec<&Resource>, Vec<&Resource>) = candidates
            .iter()
            .partition(|resource| exclude.contains(&resource.display_name));

        info!(
            "Found {} module notebook(s), {} excluded",
            candidates.len(),
            excluded.len()
        );

        let fetched = self
            .fetch_all(selected.into_iter().cloned().collect(), &scratch_dir)
            .await?;

        self.cache.install_search_root(&scratch_dir);

        let names: HashSet<String> = candidates
            .iter()
            .map(|resource| resource.display_name.clone())
            .collect();
        let evicted = self.cache.evict(&names);
        self.cache.invalidate_caches();

        debug!("Evicted {} loaded module(s)", evicted);
        info!("Refreshed {} module(s)", fetched.len());

        Ok(RefreshReport {
            workspace,
            scratch_dir,
            candidates: candidates.iter().map(|r| r.display_name.clone()).collect(),
            fetched,
            excluded: excluded.iter().map(|r| r.display_name.clone()).collect(),
            evicted,
            started_at,
            completed_at: Utc::now(),
        })
    }

    /// Fetches `resources` concurrently, stopping at the first failure
    async fn fetch_all(
        &self,
        resources: Vec<Resource>,
        scratch_dir: &Path,
    ) -> Result<Vec<String>, RefreshError> {
        let semaphore = Arc::new(Semaphore::new(self.max_parallel_fetches));
        let mut tasks = JoinSet::new();

        for resource in resources {
            tasks.spawn(fetch_with_permit(
                Arc::clone(&self.fetcher),
                Arc::clone(&semaphore),
                resource,
                scratch_dir.to_path_buf(),
            ));
        }

        let mut fetched = Vec::with_capacity(tasks.len());

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok((name, Ok(path)))) => {
                    debug!("'{}' written to {}", name, path.display());
                    fetched.push(name);
                }
                Ok(Ok((name, Err(source)))) => {
                    error!("'{}' generated an exception: {}", name, source);
                    return Err(RefreshError::Fetch { name, source });
                }
                Ok(Err(closed)) => return Err(closed.into()),
                Err(e) => {
                    error!("Fetch task panicked: {}", e);
                    return Err(RefreshError::TaskPanicked(e.to_string()));
                }
            }
        }

        Ok(fetched)
    }
}

/// Fetches one resource while holding a pool permit
async fn fetch_with_permit(
    fetcher: Arc<dyn FetchService>,
    semaphore: Arc<Semaphore>,
    resource: Resource,
    scratch_dir: PathBuf,
) -> Result<(String, Result<PathBuf, FetchError>), AcquireError> {
    let _permit = semaphore.acquire_owned().await?;
    let outcome = fetcher.fetch_to_scratch(&resource, &scratch_dir).await;
    Ok((resource.display_name, outcome))
}

//! Module cache service
//!
//! Owns everything an importer sees: the scratch directory notebooks are
//! written to, the ordered list of search roots, the registry of modules that
//! were already loaded, and a per-root index of which module files exist.
//!
//! The index is only rebuilt after `invalidate_caches`, so files written
//! behind the cache's back stay invisible until then.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info};

/// Directory below the temp root holding one scratch directory per workspace
pub const MODULES_DIR: &str = "python_modules";

/// Extension of module files
const MODULE_EXTENSION: &str = "py";

/// Scratch directory of a workspace: `<temp_root>/python_modules/<workspace>`
pub fn scratch_path(temp_root: &Path, workspace_name: &str) -> PathBuf {
    temp_root.join(MODULES_DIR).join(workspace_name)
}

#[derive(Debug, Error)]
pub enum ModuleCacheError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No module named '{0}' on the search path")]
    NotFound(String),
}

/// Service trait for the process-wide module state touched by a refresh
pub trait ModuleCache: Send + Sync {
    /// Directory refreshed notebooks are written to
    fn scratch_dir(&self) -> &Path;

    /// Removes the scratch directory with all its content and recreates it empty
    ///
    /// Blocking. The cached layout is kept until [`ModuleCache::invalidate_caches`].
    fn reset(&self) -> Result<(), ModuleCacheError>;

    /// Makes `root` the first search root, keeping a single occurrence
    fn install_search_root(&self, root: &Path);

    /// Drops loaded modules by name
    ///
    /// # Returns
    /// Number of registry entries removed
    fn evict(&self, names: &HashSet<String>) -> usize;

    /// Forgets what is known about the layout of the search roots
    fn invalidate_caches(&self);
}

/// A module loaded through the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    pub name: String,

    /// File the module was read from
    pub origin: PathBuf,

    pub source: Arc<str>,
}

/// In-process implementation of [`ModuleCache`]
#[derive(Debug)]
pub struct LocalModuleCache {
    scratch_dir: PathBuf,
    search_path: Mutex<Vec<PathBuf>>,
    registry: Mutex<HashMap<String, LoadedModule>>,
    /// Module names found in each search root
    layout: Mutex<HashMap<PathBuf, HashSet<String>>>,
}

impl LocalModuleCache {
    /// Creates a cache writing to `scratch_dir`
    ///
    /// Nothing is touched on disk until [`ModuleCache::reset`].
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            search_path: Mutex::new(Vec::new()),
            registry: Mutex::new(HashMap::new()),
            layout: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of the search roots, highest priority first
    pub fn search_path(&self) -> Vec<PathBuf> {
        lock(&self.search_path).clone()
    }

    /// Whether `name` is currently held in the registry
    pub fn is_loaded(&self, name: &str) -> bool {
        lock(&self.registry).contains_key(name)
    }

    /// Loads a module by name
    ///
    /// A registered module is returned as-is. Otherwise the search roots are
    /// scanned in order for `<name>.py`; the first hit is read and registered.
    pub fn import(&self, name: &str) -> Result<LoadedModule, ModuleCacheError> {
        if let Some(module) = lock(&self.registry).get(name) {
            return Ok(module.clone());
        }

        let origin = self
            .locate(name)?
            .ok_or_else(|| ModuleCacheError::NotFound(name.to_string()))?;

        let source = std::fs::read_to_string(&origin).map_err(|source| ModuleCacheError::Io {
            path: origin.clone(),
            source,
        })?;

        let module = LoadedModule {
            name: name.to_string(),
            origin,
            source: source.into(),
        };

        debug!("Loaded module '{}' from {}", name, module.origin.display());
        lock(&self.registry).insert(name.to_string(), module.clone());

        Ok(module)
    }

    /// Finds the file backing `name` through the cached layout
    fn locate(&self, name: &str) -> Result<Option<PathBuf>, ModuleCacheError> {
        for root in self.search_path() {
            let mut layout = lock(&self.layout);
            let modules = match layout.entry(root.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(index_root(&root)?),
            };

            if modules.contains(name) {
                return Ok(Some(root.join(format!("{}.{}", name, MODULE_EXTENSION))));
            }
        }

        Ok(None)
    }
}

impl ModuleCache for LocalModuleCache {
    fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    fn reset(&self) -> Result<(), ModuleCacheError> {
        let io_error = |source| ModuleCacheError::Io {
            path: self.scratch_dir.clone(),
            source,
        };

        if self.scratch_dir.is_dir() {
            debug!("Removing {}", self.scratch_dir.display());
            std::fs::remove_dir_all(&self.scratch_dir).map_err(io_error)?;
        }
        std::fs::create_dir_all(&self.scratch_dir).map_err(io_error)?;

        Ok(())
    }

    fn install_search_root(&self, root: &Path) {
        let mut search_path = lock(&self.search_path);
        if search_path.first().is_some_and(|first| first == root) {
            return;
        }

        search_path.retain(|existing| existing != root);
        search_path.insert(0, root.to_path_buf());
        info!("Installed {} as first search root", root.display());
    }

    fn evict(&self, names: &HashSet<String>) -> usize {
        let mut registry = lock(&self.registry);
        let before = registry.len();
        registry.retain(|name, _| !names.contains(name));
        before - registry.len()
    }

    fn invalidate_caches(&self) {
        lock(&self.layout).clear();
    }
}

/// Lists the module names available directly under `root`
///
/// A missing root simply has no modules.
fn index_root(root: &Path) -> Result<HashSet<String>, ModuleCacheError> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(source) => {
            return Err(ModuleCacheError::Io {
                path: root.to_path_buf(),
                source,
            });
        }
    };

    let mut modules = HashSet::new();
    for entry in entries {
        let path = entry
            .map_err(|source| ModuleCacheError::Io {
                path: root.to_path_buf(),
                source,
            })?
            .path();

        if !path.is_file() || path.extension().is_none_or(|ext| ext != MODULE_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            modules.insert(stem.to_string());
        }
    }

    Ok(modules)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

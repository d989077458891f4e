//! Service layer
//!
//! Services contain the per-notebook and per-process logic of a refresh:
//! fetching one definition to disk and owning the module search path and
//! registry.
//!
//! Both services are trait-based so the refresh cycle can be tested with doubles.

mod fetcher;
mod module_cache;

// Re-export traits
pub use fetcher::FetchService;
pub use module_cache::ModuleCache;

// Re-export implementations
pub use fetcher::StandardFetchService;
pub use module_cache::LocalModuleCache;

pub use fetcher::{FetchError, extract_source, validate_module_name};
pub use module_cache::{LoadedModule, MODULES_DIR, ModuleCacheError, scratch_path};

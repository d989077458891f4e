//! nbsync Refresher
//!
//! Materialises module notebooks as `.py` files in a per-workspace scratch
//! directory and makes them importable.
//!
//! Architecture:
//! - Configuration: connection settings, scratch location, pool width
//! - Services: fetching one notebook, owning the module search path and registry
//! - Scheduler: the refresh cycle fanning fetches out over a bounded pool

pub mod config;
pub mod scheduler;
pub mod service;

pub use config::Config;
pub use scheduler::{ModuleRefresher, RefreshError, RefreshOptions, RefreshReport};
pub use service::{
    FetchError, FetchService, LoadedModule, LocalModuleCache, ModuleCache, ModuleCacheError,
    StandardFetchService,
};

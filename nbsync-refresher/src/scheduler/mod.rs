//! Scheduler layer
//!
//! Runs one refresh cycle: reset the scratch directory, list candidates, fan
//! the fetches out over a bounded pool and, once every fetch succeeded,
//! install the scratch directory and evict stale modules.

pub mod refresher;

pub use refresher::{ModuleRefresher, RefreshError, RefreshOptions, RefreshReport};

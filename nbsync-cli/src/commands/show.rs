//! Show command handler

use anyhow::{Context, Result};
use colored::*;
use nbsync_refresher::{LocalModuleCache, ModuleCache};
use std::path::PathBuf;

/// Resolve a module from the scratch directory of the last refresh
pub fn handle_show(scratch_dir: PathBuf, module: &str) -> Result<()> {
    let cache = LocalModuleCache::new(scratch_dir);
    cache.install_search_root(cache.scratch_dir());

    let loaded = cache
        .import(module)
        .with_context(|| format!("Run `nbsync refresh` first to populate {}", cache.scratch_dir().display()))?;

    println!("{} {}", "Module:".bold(), loaded.name);
    println!("{} {}", "Origin:".bold(), loaded.origin.display());
    println!();
    println!("{}", loaded.source);

    Ok(())
}

//! Refresh command handler

use anyhow::Result;
use colored::*;
use nbsync_refresher::{
    Config, LocalModuleCache, ModuleRefresher, RefreshOptions, RefreshReport,
};
use std::sync::Arc;

/// Run one refresh cycle and print its report
pub async fn handle_refresh(
    config: &Config,
    folders: Option<Vec<String>>,
    exclude: Vec<String>,
    json: bool,
) -> Result<()> {
    tracing::debug!(
        "Workspace '{}' ({}) at {}",
        config.workspace.name,
        config.workspace.id,
        config.api_base_url
    );

    let client = Arc::new(config.client());
    let cache = Arc::new(LocalModuleCache::new(config.scratch_dir()));
    let refresher =
        ModuleRefresher::new(client, cache).with_max_parallel_fetches(config.max_parallel_fetches);

    let options = RefreshOptions {
        folders,
        exclude,
    };
    let report = refresher.refresh(options).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &RefreshReport) {
    if report.fetched.is_empty() {
        println!("{}", "No module notebooks found.".yellow());
    } else {
        println!(
            "{}",
            format!(
                "Refreshed {} module(s) of '{}':",
                report.fetched.len(),
                report.workspace
            )
            .bold()
        );
        let mut fetched = report.fetched.clone();
        fetched.sort();
        for name in fetched {
            println!("  {} {}", "▸".cyan(), name);
        }
    }

    if !report.excluded.is_empty() {
        println!("  Skipped:  {}", report.excluded.join(", ").dimmed());
    }
    println!(
        "  Location: {}",
        report.scratch_dir.display().to_string().dimmed()
    );
    println!(
        "  Took:     {}",
        format!("{} ms", report.duration().num_milliseconds()).dimmed()
    );
}

//! List command handler

use anyhow::Result;
use colored::*;
use nbsync_refresher::Config;

/// List the module notebooks matching the folder filter
pub async fn handle_list(config: &Config, folders: Option<Vec<String>>) -> Result<()> {
    let client = config.client();
    let resources = client.list_module_resources(folders.as_deref()).await?;

    if resources.is_empty() {
        println!("{}", "No module notebooks found.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} module notebook(s):", resources.len()).bold()
    );
    for resource in resources {
        println!(
            "  {} {} {}",
            "▸".cyan(),
            resource.display_name.bold(),
            resource.id.dimmed()
        );
    }

    Ok(())
}

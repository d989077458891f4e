//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod list;
mod refresh;
mod show;

use anyhow::Result;
use clap::{Args, Subcommand};
use crate::config::ConnectionArgs;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Download module notebooks into the scratch directory
    Refresh {
        #[command(flatten)]
        folders: FolderArgs,

        /// Notebook display names to skip (repeatable or comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// Print the refresh report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the module notebooks a refresh would fetch
    List {
        #[command(flatten)]
        folders: FolderArgs,
    },
    /// Resolve a module from the scratch directory and print it
    Show {
        /// Module (notebook display) name
        module: String,
    },
}

/// Folder selection shared by `refresh` and `list`
#[derive(Args, Debug)]
pub struct FolderArgs {
    /// Folder to take notebooks from (repeatable)
    #[arg(short, long = "folder", default_value = "lib")]
    pub folders: Vec<String>,

    /// Take notebooks from every folder and the workspace root
    #[arg(long, conflicts_with = "folders")]
    pub all_folders: bool,
}

impl FolderArgs {
    /// Folder filter handed to the lister, `None` for all folders
    pub fn filter(self) -> Option<Vec<String>> {
        if self.all_folders {
            None
        } else {
            Some(self.folders)
        }
    }
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module. Only commands that
/// talk to the service need a full configuration.
pub async fn handle_command(command: Commands, connection: ConnectionArgs) -> Result<()> {
    match command {
        Commands::Refresh {
            folders,
            exclude,
            json,
        } => {
            let config = connection.into_config()?;
            refresh::handle_refresh(&config, folders.filter(), exclude, json).await
        }
        Commands::List { folders } => {
            let config = connection.into_config()?;
            list::handle_list(&config, folders.filter()).await
        }
        Commands::Show { module } => show::handle_show(connection.scratch_dir()?, &module),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: Commands,
    }

    fn parse(args: &[&str]) -> Commands {
        TestCli::try_parse_from(std::iter::once("nbsync").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn test_refresh_defaults_to_lib_folder() {
        match parse(&["refresh"]) {
            Commands::Refresh {
                folders, exclude, ..
            } => {
                assert_eq!(folders.filter(), Some(vec!["lib".to_string()]));
                assert!(exclude.is_empty());
            }
            _ => panic!("expected refresh"),
        }
    }

    #[test]
    fn test_refresh_with_folders_and_excludes() {
        match parse(&[
            "refresh", "--folder", "lib", "--folder", "shared", "--exclude", "a,b",
        ]) {
            Commands::Refresh {
                folders, exclude, ..
            } => {
                assert_eq!(
                    folders.filter(),
                    Some(vec!["lib".to_string(), "shared".to_string()])
                );
                assert_eq!(exclude, vec!["a".to_string(), "b".to_string()]);
            }
            _ => panic!("expected refresh"),
        }
    }

    #[test]
    fn test_all_folders_disables_filter() {
        match parse(&["list", "--all-folders"]) {
            Commands::List { folders } => assert_eq!(folders.filter(), None),
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_all_folders_conflicts_with_folder() {
        let result = TestCli::try_parse_from(["nbsync", "list", "--all-folders", "--folder", "x"]);
        assert!(result.is_err());
    }
}

use anyhow::Result;
use aura_core::{CollectionId, Tracker};
use clap::Subcommand;

use crate::json_store::JsonFileStore;

#[derive(Subcommand, Debug)]
pub enum FolderCommand {
    /// Create a folder (its own task list and numbering)
    Add { name: String },

    /// Rename a folder
    Rename {
        /// Current name or id
        folder: String,
        name: String,
    },

    /// Delete a folder and every task in it
    Delete { folder: String },

    /// List folders with task counts
    List,
}

pub fn run(tracker: &mut Tracker<JsonFileStore>, cmd: FolderCommand) -> Result<()> {
    match cmd {
        FolderCommand::Add { name } => {
            let folder = tracker.create_folder(&name)?;
            println!("Created folder '{}' ({})", folder.name, folder.id);
        }
        FolderCommand::Rename { folder, name } => {
            let f = tracker.resolve_folder(&folder)?;
            tracker.rename_folder(&f.id, &name)?;
            println!("Renamed '{}' to '{}'", f.name, name.trim());
        }
        FolderCommand::Delete { folder } => {
            let f = tracker.resolve_folder(&folder)?;
            let count = tracker.tasks(&CollectionId::Folder(f.id.clone()))?.len();
            tracker.delete_folder(&f.id)?;
            println!("Deleted folder '{}' ({} task(s) removed)", f.name, count);
        }
        FolderCommand::List => {
            let folders = tracker.folders()?;
            if folders.is_empty() {
                println!("No folders.");
            }
            for f in folders {
                let count = tracker.tasks(&CollectionId::Folder(f.id.clone()))?.len();
                println!("- {} [{} task(s)] id={}", f.name, count, f.id);
            }
        }
    }
    Ok(())
}

//! CLI command handlers.

mod check;
mod classify;
mod delete;
mod download;
mod normalize;

pub use check::run_check_command;
pub use classify::run_classify_command;
pub use delete::run_delete_command;
pub use download::run_download_command;
pub use normalize::run_normalize_command;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use linkfile_core::{
    BibEntry, Collaborators, DatabaseContext, ExternalFileTypes, FilePreferences, LinkedFile,
    LinkedFileManager, lock_entry, share_entry,
};
use tracing::debug;

use crate::app_config::FileConfig;
use crate::cli::{LibraryArgs, TargetArgs};

/// Reads an entry from a JSON file.
fn load_entry(path: &Path) -> Result<BibEntry> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read entry file '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse entry file '{}'", path.display()))
}

/// Writes an entry back as pretty-printed JSON.
fn save_entry(path: &Path, entry: &BibEntry) -> Result<()> {
    let mut json = serde_json::to_string_pretty(entry).context("Failed to serialize entry")?;
    json.push('\n');
    fs::write(path, json)
        .with_context(|| format!("Failed to write entry file '{}'", path.display()))?;
    debug!(path = %path.display(), "entry saved");
    Ok(())
}

/// Picks the 1-based `index`th attachment.
fn select_file(entry: &BibEntry, index: u16) -> Result<LinkedFile> {
    let position = usize::from(index).saturating_sub(1);
    match entry.files().get(position) {
        Some(file) => Ok(file.clone()),
        None => bail!(
            "Entry has {} attachment(s); attachment {index} does not exist",
            entry.files().len()
        ),
    }
}

/// Effective preferences: CLI flags over config values over defaults.
fn preferences(library: &LibraryArgs, config: &FileConfig) -> FilePreferences {
    let defaults = FilePreferences::default();
    FilePreferences {
        file_name_pattern: library
            .file_name_pattern
            .clone()
            .or_else(|| config.file_name_pattern.clone())
            .unwrap_or(defaults.file_name_pattern),
        file_directory_pattern: library
            .file_directory_pattern
            .clone()
            .or_else(|| config.file_directory_pattern.clone())
            .unwrap_or(defaults.file_directory_pattern),
        store_files_relative_to_bib: !library.not_relative_to_bib
            && config
                .store_files_relative_to_bib
                .unwrap_or(defaults.store_files_relative_to_bib),
        main_file_directory: library
            .main_file_directory
            .clone()
            .or_else(|| config.main_file_directory.clone()),
    }
}

fn database_context(library: &LibraryArgs) -> DatabaseContext {
    let mut context = DatabaseContext::new();
    if let Some(database) = &library.database {
        context.set_database_path(database);
    }
    if let Some(dir) = &library.user_file_directory {
        context = context.with_user_file_directory(dir);
    }
    if let Some(dir) = &library.library_file_directory {
        context = context.with_library_file_directory(dir);
    }
    context
}

/// An entry file opened for one attachment operation.
struct Session {
    manager: LinkedFileManager,
    entry_path: std::path::PathBuf,
}

impl Session {
    fn open(target: &TargetArgs, config: &FileConfig, collaborators: Collaborators) -> Result<Self> {
        let entry = load_entry(&target.entry)?;
        let linked_file = select_file(&entry, target.file)?;
        debug!(link = %linked_file.link(), "selected attachment");
        let manager = LinkedFileManager::new(
            linked_file,
            share_entry(entry),
            Arc::new(database_context(&target.library)),
            preferences(&target.library, config),
            Arc::new(ExternalFileTypes::standard()),
            collaborators,
        );
        Ok(Self {
            manager,
            entry_path: target.entry.clone(),
        })
    }

    fn save(&self) -> Result<()> {
        let entry = lock_entry(self.manager.entry()).clone();
        save_entry(&self.entry_path, &entry)
    }
}

//! Linked file attachment management for bibliography entries.
//!
//! An entry in a reference library carries attachments: local documents or
//! remote URLs. This library locates those files on disk, classifies them by
//! MIME type or extension, names them from patterns over the entry's data,
//! downloads remote attachments into the library, and deletes or unlinks
//! them after asking the user.
//!
//! # Architecture
//!
//! - [`entry`] - entries and their attachments
//! - [`context`] - library location and file preferences
//! - [`filetype`] - file type descriptors and the classifying registry
//! - [`pattern`] - `[citationkey]`-style file and directory name patterns
//! - [`path`] - resolving attachments against base directories
//! - [`download`] - HTTP fetching and the download task
//! - [`delete`] - the delete-or-remove confirmation protocol
//! - [`dialog`] - the user interaction seam
//! - [`task`] - background tasks and executors
//! - [`manager`] - [`LinkedFileManager`], the public entry point

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod context;
pub mod delete;
pub mod dialog;
pub mod download;
pub mod entry;
mod filename;
pub mod filetype;
pub mod manager;
pub mod path;
pub mod pattern;
pub mod task;
mod user_agent;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use context::{DatabaseContext, FilePreferences};
pub use delete::{DeleteOutcome, DeletionCoordinator};
pub use dialog::{DeleteChoice, DeletePrompt, DialogService, ScriptedDialog};
pub use download::{DownloadError, DownloadedFile, Downloader, HttpClient, UrlDownload, UrlFetcher};
pub use entry::{BibEntry, EntryType, LinkedFile, SharedEntry, lock_entry, share_entry};
pub use filetype::{ExternalFileType, ExternalFileTypes};
pub use manager::{Collaborators, LinkedFileError, LinkedFileManager};
pub use path::PathResolver;
pub use pattern::NamePatternEngine;
pub use task::{
    BackgroundTask, CurrentThreadTaskExecutor, TaskError, TaskExecutor, TaskHandle, TaskStatus,
    TokioTaskExecutor,
};

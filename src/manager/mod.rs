//! Public entry point for operations on one attachment of one entry.

mod error;

pub use error::LinkedFileError;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::context::{DatabaseContext, FilePreferences};
use crate::delete::{DeleteOutcome, DeletionCoordinator};
use crate::dialog::DialogService;
use crate::download::{DownloadedFile, Downloader, UrlDownload, UrlFetcher};
use crate::entry::{LinkedFile, SharedEntry, lock_entry};
use crate::filename::{split_extension, with_extension};
use crate::filetype::{ExternalFileType, ExternalFileTypes};
use crate::path::{PathResolver, is_same_file, relativize};
use crate::pattern::NamePatternEngine;
use crate::task::{BackgroundTask, TaskExecutor, TaskHandle, TaskStatus};

/// Notification sent when a download produced a web page.
pub const HTML_DOWNLOAD_WARNING: &str = "Downloaded website as an HTML file.";

/// Injected services the manager talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub dialog: Arc<dyn DialogService>,
    pub executor: Arc<dyn TaskExecutor>,
    pub fetcher: Arc<dyn UrlFetcher>,
}

/// Operations on a single [`LinkedFile`] of a shared entry: delete, download,
/// normalize and the generated-location predicates.
///
/// The manager keeps the attachment as it was when created; after a
/// successful download or rename the updated attachment is found in the
/// entry.
pub struct LinkedFileManager {
    linked_file: LinkedFile,
    entry: SharedEntry,
    context: Arc<DatabaseContext>,
    preferences: FilePreferences,
    file_types: Arc<ExternalFileTypes>,
    engine: NamePatternEngine,
    downloader: Downloader,
    dialog: Arc<dyn DialogService>,
    executor: Arc<dyn TaskExecutor>,
}

impl std::fmt::Debug for LinkedFileManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedFileManager")
            .field("linked_file", &self.linked_file)
            .field("context", &self.context)
            .field("preferences", &self.preferences)
            .finish_non_exhaustive()
    }
}

impl LinkedFileManager {
    #[must_use]
    pub fn new(
        linked_file: LinkedFile,
        entry: SharedEntry,
        context: Arc<DatabaseContext>,
        preferences: FilePreferences,
        file_types: Arc<ExternalFileTypes>,
        collaborators: Collaborators,
    ) -> Self {
        let Collaborators {
            dialog,
            executor,
            fetcher,
        } = collaborators;
        Self {
            engine: NamePatternEngine::new(Arc::clone(&file_types)),
            downloader: Downloader::new(fetcher, Arc::clone(&file_types)),
            linked_file,
            entry,
            context,
            preferences,
            file_types,
            dialog,
            executor,
        }
    }

    #[must_use]
    pub fn linked_file(&self) -> &LinkedFile {
        &self.linked_file
    }

    #[must_use]
    pub fn entry(&self) -> &SharedEntry {
        &self.entry
    }

    fn resolver(&self) -> PathResolver<'_> {
        PathResolver::new(&self.context, &self.preferences)
    }

    /// Absolute path of the attachment, if it exists on disk.
    #[must_use]
    pub fn find_file(&self) -> Option<PathBuf> {
        self.resolver().resolve(&self.linked_file)
    }

    /// Runs the delete-or-remove protocol. Returns false only if the user
    /// cancelled.
    pub fn delete(&self) -> bool {
        self.delete_with_outcome().removed
    }

    /// Like [`delete`](Self::delete) but reports the full outcome.
    pub fn delete_with_outcome(&self) -> DeleteOutcome {
        DeletionCoordinator::new(self.resolver(), self.dialog.as_ref())
            .delete(&self.linked_file, &self.entry)
    }

    /// True if the directory the patterns generate equals the attachment's
    /// current directory.
    #[must_use]
    pub fn is_generated_path_same_as_original(&self) -> bool {
        let entry = lock_entry(&self.entry).clone();
        self.resolver()
            .is_generated_path_same_as_original(&self.linked_file, &entry, &self.engine)
    }

    /// True if the name the file name pattern generates equals the
    /// attachment's current file name.
    #[must_use]
    pub fn is_generated_name_same_as_original(&self) -> bool {
        let entry = lock_entry(&self.entry).clone();
        self.resolver().is_generated_name_same_as_original(
            &self.linked_file,
            &entry,
            &self.engine,
            &self.file_types,
        )
    }

    /// Builds the download task for this attachment with handlers that
    /// update the entry on success and notify the user on failure.
    ///
    /// # Errors
    ///
    /// [`LinkedFileError::NotOnlineLink`] if the link is not a URL and
    /// [`LinkedFileError::NoFileDirectory`] if no base directory exists.
    pub fn prepare_download_task(&self) -> Result<BackgroundTask<DownloadedFile>, LinkedFileError> {
        let Some(url) = self.linked_file.online_url() else {
            return Err(LinkedFileError::NotOnlineLink {
                link: self.linked_file.link().to_string(),
            });
        };
        let Some(target_dir) = self.context.first_existing_file_dir(&self.preferences) else {
            self.dialog.notify(
                "Could not find a file directory. Check the library and file preferences.",
            );
            return Err(LinkedFileError::NoFileDirectory);
        };

        let download = UrlDownload {
            url: url.clone(),
            entry: lock_entry(&self.entry).clone(),
            file_name_pattern: self.preferences.file_name_pattern.clone(),
            directory_pattern: self.preferences.file_directory_pattern.clone(),
        };
        debug!(url = %url, target_dir = %target_dir.display(), "prepared download");

        let on_success = {
            let entry = Arc::clone(&self.entry);
            let dialog = Arc::clone(&self.dialog);
            let directories = self.context.file_directories(&self.preferences);
            let original_link = self.linked_file.link().to_string();
            let description = self.linked_file.description().to_string();
            let declared = self.file_types.by_name(self.linked_file.file_type()).cloned();
            move |downloaded: DownloadedFile| {
                let link = relativize(&downloaded.path, &directories);
                let new_file = LinkedFile::new(description, link, downloaded.file_type.name());
                let replaced = lock_entry(&entry).replace_or_prepend_file(&original_link, new_file);
                info!(path = %downloaded.path.display(), replaced, "attachment updated from download");

                if let Some(warning) = type_mismatch_warning(declared.as_ref(), &downloaded.file_type) {
                    dialog.notify(&warning);
                }
            }
        };
        let on_failure = {
            let dialog = Arc::clone(&self.dialog);
            move |error: &crate::download::DownloadError| {
                dialog.notify(&format!("Error downloading {url}: {error}"));
            }
        };

        Ok(self
            .downloader
            .prepare_download_task(&target_dir, download)
            .on_success(on_success)
            .on_failure(on_failure))
    }

    /// Downloads the attachment's URL into the library and replaces the
    /// attachment with the local file.
    ///
    /// The work is submitted to the executor; wait on the returned handle to
    /// observe completion.
    ///
    /// # Errors
    ///
    /// As [`prepare_download_task`](Self::prepare_download_task).
    #[instrument(skip(self), fields(link = %self.linked_file.link()))]
    pub async fn download(&self) -> Result<TaskHandle, LinkedFileError> {
        let task = self.prepare_download_task()?;
        Ok(self.executor.submit(task.into_job()).await)
    }

    /// [`download`](Self::download) and wait for the task to settle.
    ///
    /// # Errors
    ///
    /// Validation errors, or [`LinkedFileError::Task`] if the worker did not
    /// finish the task.
    pub async fn download_and_wait(&self) -> Result<TaskStatus, LinkedFileError> {
        let handle = self.download().await?;
        Ok(handle.wait().await?)
    }

    /// Moves the file into the generated directory under its generated name
    /// and rewrites the attachment link.
    ///
    /// Returns `Ok(false)` when the file is already there.
    ///
    /// # Errors
    ///
    /// [`LinkedFileError::OnlineLink`] for URLs,
    /// [`LinkedFileError::FileNotFound`] if the file is missing,
    /// [`LinkedFileError::TargetExists`] if another file occupies the target.
    #[instrument(skip(self), fields(link = %self.linked_file.link()))]
    pub fn move_to_default_directory_and_rename(&self) -> Result<bool, LinkedFileError> {
        if self.linked_file.is_online_link() {
            return Err(LinkedFileError::OnlineLink {
                link: self.linked_file.link().to_string(),
            });
        }
        let Some(current) = self.find_file() else {
            return Err(LinkedFileError::FileNotFound {
                link: self.linked_file.link().to_string(),
            });
        };
        let Some(base_dir) = self.context.first_existing_file_dir(&self.preferences) else {
            return Err(LinkedFileError::NoFileDirectory);
        };

        let entry = lock_entry(&self.entry).clone();
        let current_name = current
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let current_extension = split_extension(&current_name).1;
        let file_type = self.file_type_for(current_extension);

        let stem = self
            .engine
            .file_name(&entry, None, &self.preferences.file_name_pattern, None);
        let extension = current_extension
            .map(str::to_string)
            .or_else(|| file_type.map(|t| t.extension().to_string()))
            .unwrap_or_default();
        let target = base_dir
            .join(self.engine.directory(&entry, &self.preferences.file_directory_pattern))
            .join(with_extension(&stem, &extension));

        if target == current || is_same_file(&target, &current) {
            debug!(path = %current.display(), "file already at generated location");
            return Ok(false);
        }
        if target.exists() {
            return Err(LinkedFileError::TargetExists { path: target });
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LinkedFileError::io(parent, e))?;
        }
        move_file(&current, &target)?;

        let link = relativize(&target, &self.context.file_directories(&self.preferences));
        let type_name = match self.linked_file.file_type() {
            "" => file_type.map_or("", ExternalFileType::name),
            declared => declared,
        };
        let new_file = LinkedFile::new(self.linked_file.description(), link, type_name);
        lock_entry(&self.entry).replace_or_prepend_file(self.linked_file.link(), new_file);
        info!(from = %current.display(), to = %target.display(), "moved attachment to generated location");
        Ok(true)
    }

    fn file_type_for(&self, extension: Option<&str>) -> Option<&ExternalFileType> {
        extension
            .and_then(|ext| self.file_types.by_extension(ext))
            .or_else(|| self.file_types.by_name(self.linked_file.file_type()))
    }
}

/// Warning for a download whose type deserves the user's attention. A web
/// page always warns; a document warns only when a web page was declared.
fn type_mismatch_warning(
    declared: Option<&ExternalFileType>,
    downloaded: &ExternalFileType,
) -> Option<String> {
    if downloaded.is_web_page() {
        return Some(HTML_DOWNLOAD_WARNING.to_string());
    }
    declared
        .filter(|declared| declared.is_web_page())
        .map(|_| {
            format!(
                "Expected a web page (HTML) but downloaded a {} file.",
                downloaded.name()
            )
        })
}

fn move_file(from: &Path, to: &Path) -> Result<(), LinkedFileError> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == ErrorKind::CrossesDevices => {
            warn!(from = %from.display(), to = %to.display(), "rename across devices, copying");
            std::fs::copy(from, to).map_err(|e| LinkedFileError::io(to, e))?;
            std::fs::remove_file(from).map_err(|e| LinkedFileError::io(from, e))
        }
        Err(error) => Err(LinkedFileError::io(to, error)),
    }
}

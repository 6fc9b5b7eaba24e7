//! Prepares download tasks that fetch, classify and file a remote resource.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::{Builder, PathPersistError, TempPath};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::client::UrlFetcher;
use super::constants::{TEMP_FILE_PREFIX, TEMP_FILE_SUFFIX};
use super::error::DownloadError;
use crate::entry::BibEntry;
use crate::filename::{resolve_unique_path, server_suggested_filename};
use crate::filetype::{ClassificationSource, ExternalFileType, ExternalFileTypes};
use crate::pattern::NamePatternEngine;
use crate::task::BackgroundTask;

/// Renames retried after losing a race for a free name.
const MAX_RENAME_ATTEMPTS: usize = 16;

/// What to download and how to name the result.
///
/// `entry` is a snapshot taken when the task is prepared; later edits to the
/// live entry do not change the generated name.
#[derive(Debug, Clone)]
pub struct UrlDownload {
    pub url: Url,
    pub entry: BibEntry,
    pub file_name_pattern: String,
    pub directory_pattern: String,
}

/// A downloaded file at its final location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub file_type: ExternalFileType,
    pub classified_by: ClassificationSource,
    /// Content type as sent by the server, if any.
    pub content_type: Option<String>,
}

/// Builds download tasks over an injected fetcher.
#[derive(Clone)]
pub struct Downloader {
    fetcher: Arc<dyn UrlFetcher>,
    file_types: Arc<ExternalFileTypes>,
    engine: NamePatternEngine,
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("file_types", &self.file_types)
            .finish_non_exhaustive()
    }
}

impl Downloader {
    #[must_use]
    pub fn new(fetcher: Arc<dyn UrlFetcher>, file_types: Arc<ExternalFileTypes>) -> Self {
        let engine = NamePatternEngine::new(Arc::clone(&file_types));
        Self {
            fetcher,
            file_types,
            engine,
        }
    }

    /// Returns a task that, when run:
    ///
    /// 1. streams the resource into a temporary file in `destination_dir`
    /// 2. classifies it by content type, URL suffix, then fallback type
    /// 3. renames it to the generated name below the generated directory,
    ///    adding a `_N` suffix instead of overwriting
    ///
    /// The temporary file is removed on any failure and when the task is
    /// dropped before the rename.
    #[must_use]
    pub fn prepare_download_task(
        &self,
        destination_dir: &Path,
        download: UrlDownload,
    ) -> BackgroundTask<DownloadedFile> {
        let this = self.clone();
        let destination_dir = destination_dir.to_path_buf();
        let name = format!("download {}", download.url);
        BackgroundTask::new(name, async move {
            this.run_download(&destination_dir, download).await
        })
    }

    #[instrument(skip(self, download), fields(url = %download.url, destination = %destination_dir.display()))]
    async fn run_download(
        &self,
        destination_dir: &Path,
        download: UrlDownload,
    ) -> Result<DownloadedFile, DownloadError> {
        let temp_path = create_temp_file(destination_dir)?;
        debug!(temp = %temp_path.display(), "created temporary download file");

        let fetched = self.fetcher.fetch_to_file(&download.url, &temp_path).await?;

        let classification = self
            .file_types
            .classify(fetched.content_type.as_deref(), Some(&fetched.final_url));
        let file_type = classification.file_type.clone();

        let suggested =
            server_suggested_filename(fetched.content_disposition.as_deref(), &fetched.final_url);
        let file_name = self.engine.file_name(
            &download.entry,
            Some(&file_type),
            &download.file_name_pattern,
            suggested.as_deref(),
        );
        let target_dir =
            destination_dir.join(self.engine.directory(&download.entry, &download.directory_pattern));
        tokio::fs::create_dir_all(&target_dir)
            .await
            .map_err(|e| DownloadError::io(&target_dir, e))?;

        let path = persist_without_overwrite(temp_path, &target_dir, &file_name)?;
        info!(
            path = %path.display(),
            file_type = %file_type,
            classified_by = ?classification.source,
            "download stored"
        );

        Ok(DownloadedFile {
            path,
            file_type,
            classified_by: classification.source,
            content_type: fetched.content_type,
        })
    }
}

fn create_temp_file(destination_dir: &Path) -> Result<TempPath, DownloadError> {
    Builder::new()
        .prefix(TEMP_FILE_PREFIX)
        .suffix(TEMP_FILE_SUFFIX)
        .tempfile_in(destination_dir)
        .map(tempfile::NamedTempFile::into_temp_path)
        .map_err(|e| DownloadError::io(destination_dir, e))
}

/// Moves `temp_path` to a free name derived from `file_name` in `dir`.
fn persist_without_overwrite(
    mut temp_path: TempPath,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf, DownloadError> {
    let mut attempts = 0;
    loop {
        let target = resolve_unique_path(dir, file_name);
        match temp_path.persist_noclobber(&target) {
            Ok(()) => return Ok(target),
            Err(PathPersistError { error, path })
                if error.kind() == ErrorKind::AlreadyExists && attempts < MAX_RENAME_ATTEMPTS =>
            {
                warn!(target = %target.display(), "target appeared during rename, retrying");
                attempts += 1;
                temp_path = path;
            }
            Err(PathPersistError { error, .. }) => return Err(DownloadError::io(&target, error)),
        }
    }
}

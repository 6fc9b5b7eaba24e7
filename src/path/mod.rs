//! Locating attachments on disk and comparing them with generated locations.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, instrument};

use crate::context::{DatabaseContext, FilePreferences};
use crate::entry::{BibEntry, LinkedFile};
use crate::filename::split_extension;
use crate::filetype::ExternalFileTypes;
use crate::pattern::NamePatternEngine;

/// Resolves stored attachment links against a library's base directories.
///
/// A missing file is a normal outcome (`None`), never an error.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    context: &'a DatabaseContext,
    preferences: &'a FilePreferences,
}

impl<'a> PathResolver<'a> {
    #[must_use]
    pub fn new(context: &'a DatabaseContext, preferences: &'a FilePreferences) -> Self {
        Self {
            context,
            preferences,
        }
    }

    /// Candidate base directories, see [`DatabaseContext::file_directories`].
    #[must_use]
    pub fn file_directories(&self) -> Vec<PathBuf> {
        self.context.file_directories(self.preferences)
    }

    /// Resolves `linked_file` to an existing absolute path.
    #[must_use]
    #[instrument(level = "debug", skip(self), fields(link = %linked_file.link()))]
    pub fn resolve(&self, linked_file: &LinkedFile) -> Option<PathBuf> {
        let found = find_in(linked_file, &self.file_directories());
        debug!(found = ?found, "resolved linked file");
        found
    }

    /// Returns true if the directory the patterns would generate for `entry`
    /// today is the directory the attachment currently lives in.
    ///
    /// False when the file cannot be found or no base directory exists.
    #[must_use]
    pub fn is_generated_path_same_as_original(
        &self,
        linked_file: &LinkedFile,
        entry: &BibEntry,
        engine: &NamePatternEngine,
    ) -> bool {
        let Some(base_dir) = self.context.first_existing_file_dir(self.preferences) else {
            return false;
        };
        let generated_dir =
            base_dir.join(engine.directory(entry, &self.preferences.file_directory_pattern));
        let Some(current_dir) = self
            .resolve(linked_file)
            .and_then(|path| path.parent().map(Path::to_path_buf))
        else {
            return false;
        };
        is_same_file(&generated_dir, &current_dir)
    }

    /// Returns true if the attachment's file name equals the name the file
    /// name pattern generates for `entry` (keeping the current extension).
    #[must_use]
    pub fn is_generated_name_same_as_original(
        &self,
        linked_file: &LinkedFile,
        entry: &BibEntry,
        engine: &NamePatternEngine,
        file_types: &ExternalFileTypes,
    ) -> bool {
        let Some(current_name) = Path::new(linked_file.link())
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
        else {
            return false;
        };
        let file_type = split_extension(&current_name)
            .1
            .and_then(|extension| file_types.by_extension(extension))
            .or_else(|| file_types.by_name(linked_file.file_type()));
        let generated = engine.file_name(
            entry,
            file_type,
            &self.preferences.file_name_pattern,
            None,
        );
        generated == current_name
    }
}

/// Finds `linked_file` on disk: an absolute link is checked as-is, a
/// relative link is tried below each directory in order.
#[must_use]
pub fn find_in(linked_file: &LinkedFile, directories: &[PathBuf]) -> Option<PathBuf> {
    if linked_file.is_online_link() {
        return None;
    }
    let link = linked_file.link().trim();
    if link.is_empty() {
        return None;
    }

    let path = Path::new(link);
    if path.is_absolute() {
        return path.exists().then(|| path.to_path_buf());
    }

    directories
        .iter()
        .map(|dir| dir.join(path))
        .find(|candidate| candidate.exists())
}

/// Expresses `path` relative to the first directory containing it, as a
/// `/`-separated link. Paths outside every directory stay absolute.
#[must_use]
pub fn relativize(path: &Path, directories: &[PathBuf]) -> String {
    for dir in directories {
        if let Ok(relative) = path.strip_prefix(dir) {
            return to_link(relative);
        }
        if let (Ok(canonical_path), Ok(canonical_dir)) = (path.canonicalize(), dir.canonicalize())
            && let Ok(relative) = canonical_path.strip_prefix(&canonical_dir)
        {
            return to_link(relative);
        }
    }
    path.to_string_lossy().into_owned()
}

fn to_link(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// True if both paths exist and point at the same filesystem object.
pub(crate) fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

//! Canonical attachment names and directories generated from patterns.
//!
//! The engine expands the user's file-name pattern and directory pattern
//! against an entry. The resulting file name always carries the extension of
//! the resolved [`ExternalFileType`]; an extension that leaked into the
//! expanded text (for instance from a citation key such as `paper.pdf`) is
//! dropped first so a later type correction cannot leave a stale extension.
//!
//! Collisions with existing files are the caller's concern.

mod bracket;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::entry::BibEntry;
use crate::filename::{sanitize_directory_name, sanitize_filename, split_extension, with_extension};
use crate::filetype::{ExternalFileType, ExternalFileTypes};

/// Name used when neither the pattern nor the entry yields anything.
pub const DEFAULT_FILE_STEM: &str = "default";

/// File name and relative directory produced by [`NamePatternEngine::expand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedName {
    /// File name including the extension of the resolved type.
    pub file_name: String,
    /// Directory relative to a base directory; empty when the pattern is empty.
    pub directory: PathBuf,
}

impl GeneratedName {
    /// `directory/file_name`, relative to a base directory.
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// Expands name and directory patterns against entry data.
#[derive(Debug, Clone)]
pub struct NamePatternEngine {
    file_types: Arc<ExternalFileTypes>,
}

impl NamePatternEngine {
    #[must_use]
    pub fn new(file_types: Arc<ExternalFileTypes>) -> Self {
        Self { file_types }
    }

    /// Expands both patterns for `entry`.
    ///
    /// When `file_type` is `None` the expanded name is returned without an
    /// extension.
    #[must_use]
    pub fn expand(
        &self,
        entry: &BibEntry,
        file_type: Option<&ExternalFileType>,
        name_pattern: &str,
        directory_pattern: &str,
    ) -> GeneratedName {
        GeneratedName {
            file_name: self.file_name(entry, file_type, name_pattern, None),
            directory: self.directory(entry, directory_pattern),
        }
    }

    /// Expands the file name pattern and appends the type's extension.
    ///
    /// Empty expansions fall back to the citation key, then to the stem of
    /// `fallback_name` (a server-suggested name), then to [`DEFAULT_FILE_STEM`].
    #[must_use]
    pub fn file_name(
        &self,
        entry: &BibEntry,
        file_type: Option<&ExternalFileType>,
        name_pattern: &str,
        fallback_name: Option<&str>,
    ) -> String {
        let stem = self.file_stem(entry, name_pattern, fallback_name);
        let file_name = match file_type {
            Some(file_type) => with_extension(&stem, file_type.extension()),
            None => stem,
        };
        debug!(pattern = name_pattern, file_name = %file_name, "expanded file name pattern");
        file_name
    }

    /// Expands the directory pattern into a relative, sanitized directory.
    #[must_use]
    pub fn directory(&self, entry: &BibEntry, directory_pattern: &str) -> PathBuf {
        let expanded = bracket::expand_brackets(directory_pattern, entry);
        sanitize_directory_name(&expanded)
    }

    fn file_stem(&self, entry: &BibEntry, name_pattern: &str, fallback_name: Option<&str>) -> String {
        let candidates = [
            Some(bracket::expand_brackets(name_pattern, entry)),
            entry.citation_key().map(str::to_string),
            fallback_name.map(str::to_string),
        ];
        candidates
            .into_iter()
            .flatten()
            .map(|candidate| self.clean_stem(&candidate))
            .find(|stem| !stem.is_empty())
            .unwrap_or_else(|| DEFAULT_FILE_STEM.to_string())
    }

    /// Sanitizes a stem and drops a trailing registered extension.
    fn clean_stem(&self, raw: &str) -> String {
        let sanitized = sanitize_filename(raw);
        let stem = match split_extension(&sanitized) {
            (stem, Some(extension)) if self.file_types.is_known_extension(extension) => stem,
            _ => sanitized.as_str(),
        };
        stem.trim().trim_matches('_').to_string()
    }
}

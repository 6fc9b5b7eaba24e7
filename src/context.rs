//! Library context and file preferences consulted when locating attachments.
//!
//! [`DatabaseContext`] knows where the library file lives and which directories
//! its metadata designates for attachments; [`FilePreferences`] carries the
//! user's naming patterns and directory settings. Both are read-only from the
//! point of view of attachment operations.

use std::path::{Path, PathBuf};

/// Default file name pattern: the entry's citation key.
pub const DEFAULT_FILE_NAME_PATTERN: &str = "[citationkey]";

/// User preferences governing where attachments live and how they are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePreferences {
    /// Pattern expanded into the attachment's file name (without extension).
    pub file_name_pattern: String,
    /// Pattern expanded into a directory below the base directory; may be empty.
    pub file_directory_pattern: String,
    /// Whether the library file's own directory is a base directory.
    pub store_files_relative_to_bib: bool,
    /// Global attachment directory used when the library designates none.
    pub main_file_directory: Option<PathBuf>,
}

impl Default for FilePreferences {
    fn default() -> Self {
        Self {
            file_name_pattern: DEFAULT_FILE_NAME_PATTERN.to_string(),
            file_directory_pattern: String::new(),
            store_files_relative_to_bib: true,
            main_file_directory: None,
        }
    }
}

/// The library an entry belongs to, as far as file resolution is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseContext {
    database_path: Option<PathBuf>,
    user_file_directory: Option<PathBuf>,
    library_file_directory: Option<PathBuf>,
}

impl DatabaseContext {
    /// Creates a context for an unsaved library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context for a library stored at `path`.
    #[must_use]
    pub fn with_database_path(path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn set_database_path(&mut self, path: impl Into<PathBuf>) {
        self.database_path = Some(path.into());
    }

    /// Sets the per-user attachment directory stored in the library metadata.
    #[must_use]
    pub fn with_user_file_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_file_directory = Some(dir.into());
        self
    }

    /// Sets the shared attachment directory stored in the library metadata.
    #[must_use]
    pub fn with_library_file_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.library_file_directory = Some(dir.into());
        self
    }

    #[must_use]
    pub fn database_path(&self) -> Option<&Path> {
        self.database_path.as_deref()
    }

    /// Directory containing the library file.
    #[must_use]
    pub fn database_directory(&self) -> Option<PathBuf> {
        self.database_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
    }

    /// Candidate base directories, in lookup order:
    ///
    /// 1. user-specific directory from the library metadata
    /// 2. shared directory from the library metadata
    /// 3. the library file's directory, if files are stored relative to it
    /// 4. the global main file directory from the preferences
    ///
    /// Relative metadata directories are resolved against the library file's
    /// directory. Duplicates are dropped. Directories need not exist.
    #[must_use]
    pub fn file_directories(&self, preferences: &FilePreferences) -> Vec<PathBuf> {
        let database_dir = self.database_directory();
        let mut dirs: Vec<PathBuf> = Vec::new();
        let mut push = |dir: PathBuf| {
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        };

        for metadata_dir in [&self.user_file_directory, &self.library_file_directory]
            .into_iter()
            .flatten()
        {
            push(resolve_against(database_dir.as_deref(), metadata_dir));
        }

        if preferences.store_files_relative_to_bib
            && let Some(dir) = database_dir.clone()
        {
            push(dir);
        }

        if let Some(main_dir) = &preferences.main_file_directory {
            push(main_dir.clone());
        }

        dirs
    }

    /// First candidate base directory that exists on disk.
    #[must_use]
    pub fn first_existing_file_dir(&self, preferences: &FilePreferences) -> Option<PathBuf> {
        self.file_directories(preferences)
            .into_iter()
            .find(|dir| dir.is_dir())
    }
}

fn resolve_against(base: Option<&Path>, dir: &Path) -> PathBuf {
    match base {
        Some(base) if dir.is_relative() => base.join(dir),
        _ => dir.to_path_buf(),
    }
}

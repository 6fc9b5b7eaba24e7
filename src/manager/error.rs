use std::path::PathBuf;

use thiserror::Error;

use crate::task::TaskError;

/// Failures of [`LinkedFileManager`](super::LinkedFileManager) operations.
///
/// Expected outcomes (file missing on delete, user cancel, unknown MIME type)
/// are values, not errors.
#[derive(Debug, Error)]
pub enum LinkedFileError {
    #[error("'{link}' is not an online link")]
    NotOnlineLink { link: String },

    #[error("'{link}' is an online link, not a local file")]
    OnlineLink { link: String },

    /// None of the library's base directories exists.
    #[error("no existing file directory is configured for this library")]
    NoFileDirectory,

    #[error("file '{link}' was not found in any file directory")]
    FileNotFound { link: String },

    #[error("target file already exists: {path}")]
    TargetExists { path: PathBuf },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Task(#[from] TaskError),
}

impl LinkedFileError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

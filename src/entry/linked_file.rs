//! A single file attachment of a bibliography entry.

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

/// A reference (local path or remote URL) attaching a document to an entry.
///
/// `file_type` is the name of an [`ExternalFileType`](crate::ExternalFileType)
/// and may be empty until an operation classifies the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkedFile {
    #[serde(default)]
    description: String,
    link: String,
    #[serde(default)]
    file_type: String,
}

impl LinkedFile {
    /// Creates a linked file from its three stored attributes.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        link: impl Into<String>,
        file_type: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            link: link.into(),
            file_type: file_type.into(),
        }
    }

    /// Creates a linked file pointing at a local path.
    #[must_use]
    pub fn from_path(
        description: impl Into<String>,
        path: &Path,
        file_type: impl Into<String>,
    ) -> Self {
        Self::new(description, path.to_string_lossy(), file_type)
    }

    /// Creates a linked file pointing at a remote resource.
    #[must_use]
    pub fn from_url(url: &Url, file_type: impl Into<String>) -> Self {
        Self::new("", url.as_str(), file_type)
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn link(&self) -> &str {
        &self.link
    }

    #[must_use]
    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_link(&mut self, link: impl Into<String>) {
        self.link = link.into();
    }

    pub fn set_file_type(&mut self, file_type: impl Into<String>) {
        self.file_type = file_type.into();
    }

    /// Returns true if the link refers to a remote resource rather than a path.
    #[must_use]
    pub fn is_online_link(&self) -> bool {
        self.online_url().is_some()
    }

    /// Parses the link as a downloadable URL.
    ///
    /// Accepts `http`, `https` and `ftp` URLs, and bare `www.` hosts (read as
    /// `https`). Drive-letter paths such as `C:\papers\a.pdf` are not URLs.
    #[must_use]
    pub fn online_url(&self) -> Option<Url> {
        let link = self.link.trim();
        if link
            .get(..4)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("www."))
        {
            return Url::parse(&format!("https://{link}")).ok();
        }
        let url = Url::parse(link).ok()?;
        matches!(url.scheme(), "http" | "https" | "ftp").then_some(url)
    }
}

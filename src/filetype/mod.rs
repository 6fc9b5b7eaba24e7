//! External file type descriptors and the registry that classifies files.
//!
//! An [`ExternalFileType`] maps a logical file kind (`PDF`, `URL`, ...) to its
//! canonical extension and MIME type. [`ExternalFileTypes`] is the immutable
//! registry built once at startup and shared (behind an `Arc`) by every
//! component that needs to classify a file.
//!
//! # Example
//!
//! ```
//! use linkfile_core::filetype::ExternalFileTypes;
//!
//! let registry = ExternalFileTypes::standard();
//! let html = registry.by_mime_type("text/html; charset=UTF-8").unwrap();
//! assert_eq!(html.name(), "URL");
//! assert_eq!(registry.by_extension("PDF").unwrap().name(), "PDF");
//! ```

mod registry;

pub use registry::{
    Classification, ClassificationSource, ExternalFileTypes, RegistryError, extension_from_url,
    normalize_extension, normalize_mime_type,
};

use std::fmt;

/// Name of the standard PDF file type.
pub const PDF_TYPE_NAME: &str = "PDF";

/// Name of the standard web page type, also the opaque fallback type.
pub const URL_TYPE_NAME: &str = "URL";

/// Standard types as `(name, extension, mime type)`.
const STANDARD_FILE_TYPES: &[(&str, &str, &str)] = &[
    (PDF_TYPE_NAME, "pdf", "application/pdf"),
    ("PostScript", "ps", "application/postscript"),
    ("Word", "doc", "application/msword"),
    (
        "Word 2007+",
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (
        "OpenDocument text",
        "odt",
        "application/vnd.oasis.opendocument.text",
    ),
    ("Excel", "xls", "application/excel"),
    (
        "Excel 2007+",
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    (
        "OpenDocument spreadsheet",
        "ods",
        "application/vnd.oasis.opendocument.spreadsheet",
    ),
    ("PowerPoint", "ppt", "application/vnd.ms-powerpoint"),
    (
        "PowerPoint 2007+",
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    (
        "OpenDocument presentation",
        "odp",
        "application/vnd.oasis.opendocument.presentation",
    ),
    ("Rich Text Format", "rtf", "application/rtf"),
    ("PNG image", "png", "image/png"),
    ("GIF image", "gif", "image/gif"),
    ("JPG image", "jpg", "image/jpeg"),
    ("Djvu", "djvu", "image/vnd.djvu"),
    ("Text", "txt", "text/plain"),
    ("LaTeX", "tex", "application/x-latex"),
    ("CHM", "chm", "application/mshelp"),
    ("TIFF image", "tiff", "image/tiff"),
    (URL_TYPE_NAME, "html", "text/html"),
    ("MHT", "mht", "multipart/related"),
    ("ePUB", "epub", "application/epub+zip"),
];

/// Immutable descriptor of a logical file kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalFileType {
    name: String,
    extension: String,
    mime_type: String,
    open_with: Option<String>,
}

impl ExternalFileType {
    /// Creates a descriptor. The extension is stored without a leading dot.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        extension: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        let extension = extension.into();
        Self {
            name: name.into(),
            extension: extension.trim_start_matches('.').to_string(),
            mime_type: mime_type.into(),
            open_with: None,
        }
    }

    /// Binds the type to an application used to open it.
    #[must_use]
    pub fn with_open_with(mut self, application: impl Into<String>) -> Self {
        self.open_with = Some(application.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[must_use]
    pub fn open_with(&self) -> Option<&str> {
        self.open_with.as_deref()
    }

    /// Returns true for the web page type (`text/html`).
    #[must_use]
    pub fn is_web_page(&self) -> bool {
        self.name.eq_ignore_ascii_case(URL_TYPE_NAME)
            || self.mime_type.eq_ignore_ascii_case("text/html")
    }

    /// Returns the built-in type table.
    #[must_use]
    pub fn standard_types() -> Vec<Self> {
        STANDARD_FILE_TYPES
            .iter()
            .map(|(name, extension, mime)| Self::new(*name, *extension, *mime))
            .collect()
    }
}

impl fmt::Display for ExternalFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

//! Lookup of registered file types by extension, MIME type and name.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;
use url::Url;

use super::{ExternalFileType, URL_TYPE_NAME};

/// Errors raised while building a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The designated fallback type is not part of the registered types.
    #[error("fallback file type '{name}' is not registered")]
    UnknownFallback {
        /// Name that failed to resolve.
        name: String,
    },
}

/// Which signal decided a [`Classification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    /// The response content type matched a registered MIME type.
    MimeType,
    /// The URL path suffix matched a registered extension.
    Extension,
    /// Nothing matched; the opaque fallback type was used.
    Fallback,
}

/// Result of classifying a downloaded resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    /// The resolved file type.
    pub file_type: &'a ExternalFileType,
    /// Which signal produced it.
    pub source: ClassificationSource,
}

/// Immutable set of file types keyed by extension, MIME type and name.
///
/// When two types share a key, the one registered first wins.
#[derive(Debug, Clone)]
pub struct ExternalFileTypes {
    types: Vec<ExternalFileType>,
    by_extension: HashMap<String, usize>,
    by_mime_type: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    fallback: usize,
}

impl ExternalFileTypes {
    /// Builds the registry seeded with the standard type table, using `URL`
    /// as the fallback for unclassifiable resources.
    #[must_use]
    pub fn standard() -> Self {
        let types = ExternalFileType::standard_types();
        let fallback = types
            .iter()
            .position(|t| t.name() == URL_TYPE_NAME)
            .unwrap_or(0);
        Self::build(types, fallback)
    }

    /// Builds a registry from custom types.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownFallback`] if no type is named `fallback_name`.
    pub fn new(
        types: Vec<ExternalFileType>,
        fallback_name: &str,
    ) -> Result<Self, RegistryError> {
        let fallback = types
            .iter()
            .position(|t| t.name().eq_ignore_ascii_case(fallback_name))
            .ok_or_else(|| RegistryError::UnknownFallback {
                name: fallback_name.to_string(),
            })?;
        Ok(Self::build(types, fallback))
    }

    fn build(types: Vec<ExternalFileType>, fallback: usize) -> Self {
        let mut by_extension = HashMap::new();
        let mut by_mime_type = HashMap::new();
        let mut by_name = HashMap::new();
        for (index, file_type) in types.iter().enumerate() {
            if let Some(extension) = normalize_extension(file_type.extension()) {
                by_extension.entry(extension).or_insert(index);
            }
            if let Some(mime) = normalize_mime_type(file_type.mime_type()) {
                by_mime_type.entry(mime).or_insert(index);
            }
            by_name
                .entry(file_type.name().to_lowercase())
                .or_insert(index);
        }
        Self {
            types,
            by_extension,
            by_mime_type,
            by_name,
            fallback,
        }
    }

    /// Looks up a type by extension, ignoring case and a leading dot.
    #[must_use]
    pub fn by_extension(&self, extension: &str) -> Option<&ExternalFileType> {
        let key = normalize_extension(extension)?;
        self.by_extension.get(&key).map(|&index| &self.types[index])
    }

    /// Looks up a type by MIME type. Parameters after `;` are ignored, so
    /// `text/html; charset=UTF-8` resolves like `text/html`.
    #[must_use]
    pub fn by_mime_type(&self, mime_type: &str) -> Option<&ExternalFileType> {
        let key = normalize_mime_type(mime_type)?;
        self.by_mime_type.get(&key).map(|&index| &self.types[index])
    }

    /// Looks up a type by its name (the key stored on a linked file).
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&ExternalFileType> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&index| &self.types[index])
    }

    /// Returns the opaque type used when nothing else matches.
    #[must_use]
    pub fn fallback(&self) -> &ExternalFileType {
        &self.types[self.fallback]
    }

    /// Returns true if `extension` belongs to a registered type.
    #[must_use]
    pub fn is_known_extension(&self, extension: &str) -> bool {
        self.by_extension(extension).is_some()
    }

    /// Iterates over all registered types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ExternalFileType> {
        self.types.iter()
    }

    /// Classifies a resource from its response content type and source URL.
    ///
    /// Order: content type, then URL path suffix, then the fallback type.
    /// Never fails.
    #[must_use]
    pub fn classify(&self, content_type: Option<&str>, url: Option<&Url>) -> Classification<'_> {
        if let Some(file_type) = content_type.and_then(|mime| self.by_mime_type(mime)) {
            debug!(content_type = ?content_type, file_type = %file_type, "classified by MIME type");
            return Classification {
                file_type,
                source: ClassificationSource::MimeType,
            };
        }

        if let Some(file_type) = url
            .and_then(extension_from_url)
            .and_then(|extension| self.by_extension(&extension))
        {
            debug!(content_type = ?content_type, file_type = %file_type, "classified by URL suffix");
            return Classification {
                file_type,
                source: ClassificationSource::Extension,
            };
        }

        debug!(
            content_type = ?content_type,
            fallback = %self.fallback(),
            "unclassified resource, using fallback type"
        );
        Classification {
            file_type: self.fallback(),
            source: ClassificationSource::Fallback,
        }
    }
}

impl Default for ExternalFileTypes {
    fn default() -> Self {
        Self::standard()
    }
}

/// Strips MIME parameters and lowercases the essence (`text/html`).
#[must_use]
pub fn normalize_mime_type(raw: &str) -> Option<String> {
    let essence = raw.split(';').next().unwrap_or("").trim().to_lowercase();
    (!essence.is_empty()).then_some(essence)
}

/// Lowercases an extension and strips a leading dot.
#[must_use]
pub fn normalize_extension(raw: &str) -> Option<String> {
    let extension = raw.trim().trim_start_matches('.').to_lowercase();
    (!extension.is_empty()).then_some(extension)
}

/// Returns the extension of the last URL path segment, without the dot.
#[must_use]
pub fn extension_from_url(url: &Url) -> Option<String> {
    let last_segment = url.path_segments()?.next_back()?;
    let dot_index = last_segment.rfind('.')?;
    let extension = &last_segment[dot_index + 1..];
    if extension.is_empty() || extension.len() > 12 {
        return None;
    }
    Some(extension.to_lowercase())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::filetype::PDF_TYPE_NAME;

    #[test]
    fn test_mime_type_with_parameter_matches_bare_type() {
        let registry = ExternalFileTypes::standard();
        let with_parameter = registry.by_mime_type("text/html; charset=UTF-8").unwrap();
        let bare = registry.by_mime_type("text/html").unwrap();
        assert_eq!(with_parameter, bare);
        assert_eq!(with_parameter.to_string(), "URL");
    }

    #[test]
    fn test_mime_type_lookup_ignores_case_and_whitespace() {
        let registry = ExternalFileTypes::standard();
        let pdf = registry.by_mime_type("  Application/PDF ").unwrap();
        assert_eq!(pdf.name(), PDF_TYPE_NAME);
    }

    #[test]
    fn test_unknown_mime_type_is_none() {
        let registry = ExternalFileTypes::standard();
        assert!(registry.by_mime_type("application/octet-stream").is_none());
        assert!(registry.by_mime_type("").is_none());
        assert!(registry.by_mime_type("; charset=UTF-8").is_none());
    }

    #[test]
    fn test_extension_lookup_is_case_insensitive() {
        let registry = ExternalFileTypes::standard();
        assert_eq!(registry.by_extension("PDF").unwrap().name(), "PDF");
        assert_eq!(registry.by_extension(".pdf").unwrap().name(), "PDF");
        assert_eq!(registry.by_extension("Html").unwrap().name(), "URL");
        assert!(registry.by_extension("0408v1").is_none());
    }

    #[test]
    fn test_name_lookup() {
        let registry = ExternalFileTypes::standard();
        assert_eq!(registry.by_name("pdf").unwrap().extension(), "pdf");
        assert_eq!(registry.by_name("Word 2007+").unwrap().extension(), "docx");
        assert!(registry.by_name("").is_none());
    }

    #[test]
    fn test_classify_prefers_mime_type_over_url_suffix() {
        let registry = ExternalFileTypes::standard();
        let url = Url::parse("https://example.org/paper.pdf").unwrap();
        let classification = registry.classify(Some("text/html; charset=utf-8"), Some(&url));
        assert_eq!(classification.file_type.name(), "URL");
        assert_eq!(classification.source, ClassificationSource::MimeType);
    }

    #[test]
    fn test_classify_falls_back_to_url_suffix() {
        let registry = ExternalFileTypes::standard();
        let url = Url::parse("https://example.org/files/paper.PDF").unwrap();
        let classification = registry.classify(Some("application/octet-stream"), Some(&url));
        assert_eq!(classification.file_type.name(), "PDF");
        assert_eq!(classification.source, ClassificationSource::Extension);
    }

    #[test]
    fn test_classify_unknown_uses_fallback() {
        let registry = ExternalFileTypes::standard();
        let url = Url::parse("http://arxiv.org/pdf/1207.0408v1").unwrap();
        let classification = registry.classify(None, Some(&url));
        assert_eq!(classification.file_type.name(), "URL");
        assert_eq!(classification.source, ClassificationSource::Fallback);
    }

    #[test]
    fn test_custom_registry_requires_known_fallback() {
        let types = vec![ExternalFileType::new("PDF", "pdf", "application/pdf")];
        let err = ExternalFileTypes::new(types.clone(), "Binary").unwrap_err();
        assert!(err.to_string().contains("Binary"));
        let registry = ExternalFileTypes::new(types, "pdf").unwrap();
        assert_eq!(registry.fallback().name(), "PDF");
    }

    #[test]
    fn test_first_registered_type_wins_on_shared_extension() {
        let types = vec![
            ExternalFileType::new("Markdown", "md", "text/markdown"),
            ExternalFileType::new("Other Markdown", "md", "text/x-markdown"),
        ];
        let registry = ExternalFileTypes::new(types, "Markdown").unwrap();
        assert_eq!(registry.by_extension("md").unwrap().name(), "Markdown");
        assert_eq!(
            registry.by_mime_type("text/x-markdown").unwrap().name(),
            "Other Markdown"
        );
    }

    #[test]
    fn test_extension_from_url() {
        let url = Url::parse("https://example.org/a/b/paper.pdf?download=1").unwrap();
        assert_eq!(extension_from_url(&url).as_deref(), Some("pdf"));
        let url = Url::parse("https://example.org/a/b/").unwrap();
        assert_eq!(extension_from_url(&url), None);
        let url = Url::parse("https://example.org/archive.").unwrap();
        assert_eq!(extension_from_url(&url), None);
    }

    #[test]
    fn test_normalize_helpers() {
        assert_eq!(
            normalize_mime_type("Text/HTML ; charset=UTF-8").as_deref(),
            Some("text/html")
        );
        assert_eq!(normalize_extension(" .PDF ").as_deref(), Some("pdf"));
        assert_eq!(normalize_extension("."), None);
    }
}

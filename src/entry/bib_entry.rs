//! Bibliography entry owning an ordered list of attachments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{EntryType, LinkedFile};

/// A bibliography entry as far as attachment management is concerned.
///
/// Field names are stored lowercase; lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    citation_key: Option<String>,
    #[serde(default)]
    entry_type: EntryType,
    #[serde(default)]
    fields: BTreeMap<String, String>,
    #[serde(default)]
    files: Vec<LinkedFile>,
}

impl BibEntry {
    /// Creates an empty entry of the given type.
    #[must_use]
    pub fn new(entry_type: EntryType) -> Self {
        Self {
            entry_type,
            ..Self::default()
        }
    }

    /// Builder-style helper setting the citation key.
    #[must_use]
    pub fn with_citation_key(mut self, key: impl Into<String>) -> Self {
        self.set_citation_key(key);
        self
    }

    pub fn set_citation_key(&mut self, key: impl Into<String>) {
        self.citation_key = Some(key.into());
    }

    /// Returns the citation key, treating a blank key as absent.
    #[must_use]
    pub fn citation_key(&self) -> Option<&str> {
        self.citation_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn set_entry_type(&mut self, entry_type: EntryType) {
        self.entry_type = entry_type;
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Returns a field value; blank values count as missing.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    #[must_use]
    pub fn files(&self) -> &[LinkedFile] {
        &self.files
    }

    pub fn set_files(&mut self, files: Vec<LinkedFile>) {
        self.files = files;
    }

    pub fn add_file(&mut self, file: LinkedFile) {
        self.files.push(file);
    }

    /// Removes the first attachment equal to `file`. Returns whether one was removed.
    pub fn remove_file(&mut self, file: &LinkedFile) -> bool {
        match self.files.iter().position(|candidate| candidate == file) {
            Some(index) => {
                self.files.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replaces the attachment whose link equals `link` (ignoring ASCII case),
    /// or inserts `file` at the front when none matches.
    ///
    /// Returns true when an existing attachment was replaced.
    pub fn replace_or_prepend_file(&mut self, link: &str, file: LinkedFile) -> bool {
        match self
            .files
            .iter()
            .position(|candidate| candidate.link().eq_ignore_ascii_case(link))
        {
            Some(index) => {
                self.files[index] = file;
                true
            }
            None => {
                self.files.insert(0, file);
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bib_entry_blank_citation_key_is_absent() {
        let entry = BibEntry::new(EntryType::Article).with_citation_key("  ");
        assert_eq!(entry.citation_key(), None);
        let entry = entry.with_citation_key("asdf");
        assert_eq!(entry.citation_key(), Some("asdf"));
    }

    #[test]
    fn test_bib_entry_field_lookup_is_case_insensitive() {
        let mut entry = BibEntry::default();
        entry.set_field("Title", "Deep Learning");
        assert_eq!(entry.field("title"), Some("Deep Learning"));
        assert_eq!(entry.field("TITLE"), Some("Deep Learning"));
        entry.set_field("year", " ");
        assert_eq!(entry.field("year"), None);
    }

    #[test]
    fn test_bib_entry_remove_file_removes_first_match_only() {
        let file = LinkedFile::new("", "a.pdf", "PDF");
        let mut entry = BibEntry::default();
        entry.add_file(file.clone());
        entry.add_file(file.clone());
        assert!(entry.remove_file(&file));
        assert_eq!(entry.files().len(), 1);
        assert!(entry.remove_file(&file));
        assert!(!entry.remove_file(&file));
    }

    #[test]
    fn test_bib_entry_replace_matches_link_ignoring_case() {
        let mut entry = BibEntry::default();
        entry.add_file(LinkedFile::new("", "other.pdf", "PDF"));
        entry.add_file(LinkedFile::new("", "HTTPS://example.org/a", "URL"));
        let replaced = entry.replace_or_prepend_file(
            "https://example.org/a",
            LinkedFile::new("", "Misc/asdf.pdf", "PDF"),
        );
        assert!(replaced);
        assert_eq!(entry.files()[1].link(), "Misc/asdf.pdf");
        assert_eq!(entry.files().len(), 2);
    }

    #[test]
    fn test_bib_entry_replace_without_match_prepends() {
        let mut entry = BibEntry::default();
        entry.add_file(LinkedFile::new("", "other.pdf", "PDF"));
        let replaced =
            entry.replace_or_prepend_file("missing", LinkedFile::new("", "new.pdf", "PDF"));
        assert!(!replaced);
        assert_eq!(entry.files()[0].link(), "new.pdf");
    }

    #[test]
    fn test_bib_entry_json_round_trip_keeps_files() {
        let mut entry = BibEntry::new(EntryType::Book).with_citation_key("knuth1984");
        entry.set_field("title", "The TeXbook");
        entry.add_file(LinkedFile::new("scan", "knuth1984.pdf", "PDF"));
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: BibEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }
}

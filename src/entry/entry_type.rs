use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Bibliographic entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Article,
    Book,
    Booklet,
    InBook,
    InCollection,
    InProceedings,
    Manual,
    MastersThesis,
    #[default]
    Misc,
    Online,
    PhdThesis,
    Proceedings,
    TechReport,
    Unpublished,
}

impl EntryType {
    /// Returns the lowercase BibTeX key (`inproceedings`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Book => "book",
            Self::Booklet => "booklet",
            Self::InBook => "inbook",
            Self::InCollection => "incollection",
            Self::InProceedings => "inproceedings",
            Self::Manual => "manual",
            Self::MastersThesis => "mastersthesis",
            Self::Misc => "misc",
            Self::Online => "online",
            Self::PhdThesis => "phdthesis",
            Self::Proceedings => "proceedings",
            Self::TechReport => "techreport",
            Self::Unpublished => "unpublished",
        }
    }

    /// Returns the display name used when expanding `[entrytype]` (`InProceedings`).
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Article => "Article",
            Self::Book => "Book",
            Self::Booklet => "Booklet",
            Self::InBook => "InBook",
            Self::InCollection => "InCollection",
            Self::InProceedings => "InProceedings",
            Self::Manual => "Manual",
            Self::MastersThesis => "MastersThesis",
            Self::Misc => "Misc",
            Self::Online => "Online",
            Self::PhdThesis => "PhdThesis",
            Self::Proceedings => "Proceedings",
            Self::TechReport => "TechReport",
            Self::Unpublished => "Unpublished",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Error returned when parsing an unknown entry type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entry type: {0}")]
pub struct UnknownEntryType(pub String);

impl FromStr for EntryType {
    type Err = UnknownEntryType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.trim().to_ascii_lowercase().as_str() {
            "article" => Self::Article,
            "book" => Self::Book,
            "booklet" => Self::Booklet,
            "inbook" => Self::InBook,
            "incollection" => Self::InCollection,
            "inproceedings" | "conference" => Self::InProceedings,
            "manual" => Self::Manual,
            "mastersthesis" => Self::MastersThesis,
            "misc" => Self::Misc,
            "online" | "electronic" | "www" => Self::Online,
            "phdthesis" => Self::PhdThesis,
            "proceedings" => Self::Proceedings,
            "techreport" => Self::TechReport,
            "unpublished" => Self::Unpublished,
            other => return Err(UnknownEntryType(other.to_string())),
        };
        Ok(parsed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_default_is_misc() {
        assert_eq!(EntryType::default(), EntryType::Misc);
        assert_eq!(EntryType::default().display_name(), "Misc");
    }

    #[test]
    fn test_entry_type_from_str_is_case_insensitive() {
        assert_eq!(
            "InProceedings".parse::<EntryType>().unwrap(),
            EntryType::InProceedings
        );
        assert_eq!(
            "conference".parse::<EntryType>().unwrap(),
            EntryType::InProceedings
        );
        assert_eq!(" ARTICLE ".parse::<EntryType>().unwrap(), EntryType::Article);
    }

    #[test]
    fn test_entry_type_from_str_rejects_unknown() {
        let err = "poem".parse::<EntryType>().unwrap_err();
        assert!(err.to_string().contains("poem"));
    }

    #[test]
    fn test_entry_type_serde_uses_bibtex_key() {
        let json = serde_json::to_string(&EntryType::TechReport).unwrap();
        assert_eq!(json, "\"techreport\"");
        let parsed: EntryType = serde_json::from_str("\"phdthesis\"").unwrap();
        assert_eq!(parsed, EntryType::PhdThesis);
    }
}

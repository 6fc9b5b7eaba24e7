//! Expansion of bracketed pattern keys (`[citationkey]`, `[auth:lower]`, ...).

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::entry::BibEntry;

#[allow(clippy::expect_used)]
static BRACKET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\[\]]*)\]").expect("bracket regex is valid") // Static pattern, safe to panic
});

/// Words skipped by `[shorttitle]` and `[veryshorttitle]`.
const FUNCTION_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "by", "for", "from", "in", "is", "of", "on", "or",
    "the", "to", "with",
];

/// Replaces every `[key]` or `[key:modifier:...]` in `pattern` with entry data.
///
/// Unknown keys and missing fields expand to the empty string.
pub(crate) fn expand_brackets(pattern: &str, entry: &BibEntry) -> String {
    BRACKET_PATTERN
        .replace_all(pattern, |caps: &Captures<'_>| expand_key(&caps[1], entry))
        .into_owned()
}

fn expand_key(raw: &str, entry: &BibEntry) -> String {
    let mut parts = raw.split(':');
    let key = parts.next().unwrap_or("").trim();
    let value = lookup(key, entry);
    parts.fold(value, |value, modifier| apply_modifier(&value, modifier.trim()))
}

fn lookup(key: &str, entry: &BibEntry) -> String {
    match key.to_ascii_lowercase().as_str() {
        "citationkey" | "bibtexkey" => entry.citation_key().unwrap_or("").to_string(),
        "entrytype" => entry.entry_type().display_name().to_string(),
        "auth" => author_last_names(entry)
            .into_iter()
            .next()
            .unwrap_or_default(),
        "authors" => author_last_names(entry).concat(),
        "title" => significant_words(entry, usize::MAX, false),
        "fulltitle" => entry.field("title").map(strip_braces).unwrap_or_default(),
        "shorttitle" => significant_words(entry, 3, true),
        "veryshorttitle" => significant_words(entry, 1, true),
        "" => String::new(),
        field => entry.field(field).map(strip_braces).unwrap_or_default(),
    }
}

fn apply_modifier(value: &str, modifier: &str) -> String {
    match modifier.to_ascii_lowercase().as_str() {
        "lower" => value.to_lowercase(),
        "upper" => value.to_uppercase(),
        "capitalize" => value
            .split(' ')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" "),
        "" => value.to_string(),
        unknown => {
            debug!(modifier = unknown, "ignoring unknown pattern modifier");
            value.to_string()
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn strip_braces(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '{' | '}'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Last names of the `author` field (falls back to `editor`).
///
/// Understands `Last, First` and `First Last`, joined by ` and `.
fn author_last_names(entry: &BibEntry) -> Vec<String> {
    let Some(authors) = entry.field("author").or_else(|| entry.field("editor")) else {
        return Vec::new();
    };
    strip_braces(authors)
        .split(" and ")
        .filter_map(|person| {
            let person = person.trim();
            if person.is_empty() {
                return None;
            }
            let last = match person.split_once(',') {
                Some((last, _)) => last.trim(),
                None => person.split_whitespace().next_back().unwrap_or(person),
            };
            (!last.is_empty()).then(|| last.to_string())
        })
        .collect()
}

/// First `limit` title words, capitalized and concatenated.
fn significant_words(entry: &BibEntry, limit: usize, skip_function_words: bool) -> String {
    let Some(title) = entry.field("title") else {
        return String::new();
    };
    strip_braces(title)
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .filter(|word| {
            !skip_function_words || !FUNCTION_WORDS.contains(&word.to_lowercase().as_str())
        })
        .take(limit)
        .map(|word| capitalize(&word))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryType;

    fn sample_entry() -> BibEntry {
        let mut entry = BibEntry::new(EntryType::InProceedings).with_citation_key("asdf");
        entry.set_field("author", "Knuth, Donald E. and Leslie Lamport");
        entry.set_field("title", "The {Art} of Computer Programming");
        entry.set_field("year", "1968");
        entry
    }

    #[test]
    fn test_expand_citation_key_and_entry_type() {
        let entry = sample_entry();
        assert_eq!(expand_brackets("[citationkey]", &entry), "asdf");
        assert_eq!(expand_brackets("[bibtexkey]", &entry), "asdf");
        assert_eq!(expand_brackets("[entrytype]", &entry), "InProceedings");
    }

    #[test]
    fn test_expand_mixed_literal_text() {
        let entry = sample_entry();
        assert_eq!(
            expand_brackets("[auth]-[year] ([citationkey])", &entry),
            "Knuth-1968 (asdf)"
        );
    }

    #[test]
    fn test_expand_authors() {
        let entry = sample_entry();
        assert_eq!(expand_brackets("[auth]", &entry), "Knuth");
        assert_eq!(expand_brackets("[authors]", &entry), "KnuthLamport");
    }

    #[test]
    fn test_expand_titles() {
        let entry = sample_entry();
        assert_eq!(expand_brackets("[shorttitle]", &entry), "ArtComputerProgramming");
        assert_eq!(expand_brackets("[veryshorttitle]", &entry), "Art");
        assert_eq!(expand_brackets("[title]", &entry), "TheArtOfComputerProgramming");
        assert_eq!(
            expand_brackets("[fulltitle]", &entry),
            "The Art of Computer Programming"
        );
    }

    #[test]
    fn test_expand_modifiers() {
        let entry = sample_entry();
        assert_eq!(expand_brackets("[auth:lower]", &entry), "knuth");
        assert_eq!(expand_brackets("[entrytype:upper]", &entry), "INPROCEEDINGS");
        assert_eq!(expand_brackets("[fulltitle:lower:capitalize]", &entry), "The Art Of Computer Programming");
        assert_eq!(expand_brackets("[auth:bogus]", &entry), "Knuth");
    }

    #[test]
    fn test_expand_field_and_unknown_keys() {
        let entry = sample_entry();
        assert_eq!(expand_brackets("[YEAR]", &entry), "1968");
        assert_eq!(expand_brackets("[journal]", &entry), "");
        assert_eq!(expand_brackets("[]x", &entry), "x");
    }

    #[test]
    fn test_expand_without_citation_key() {
        let entry = BibEntry::default();
        assert_eq!(expand_brackets("[citationkey]", &entry), "");
        assert_eq!(expand_brackets("[entrytype]", &entry), "Misc");
    }

    #[test]
    fn test_editor_used_when_author_missing() {
        let mut entry = BibEntry::default();
        entry.set_field("editor", "Ada Lovelace");
        assert_eq!(expand_brackets("[auth]", &entry), "Lovelace");
    }
}

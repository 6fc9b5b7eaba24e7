//! File name sanitization, extension handling and collision-free paths.
//!
//! Shared by the name pattern engine (which builds canonical names) and the
//! downloader (which must never overwrite an existing file).

use std::path::{Component, Path, PathBuf};

use url::Url;

/// Highest numeric suffix tried before falling back to a timestamp.
const MAX_DUPLICATE_SUFFIX: usize = 1000;

/// Sanitizes a file name for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return String::new();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

/// Sanitizes a relative directory name, keeping `/` (or `\`) as separators.
///
/// Empty, `.` and `..` segments are dropped, so the result always stays below
/// the directory it is joined to.
pub(crate) fn sanitize_directory_name(name: &str) -> PathBuf {
    name.split(['/', '\\'])
        .map(sanitize_filename)
        .filter(|segment| !segment.is_empty() && segment != "." && segment != "..")
        .filter(|segment| !segment.chars().all(|c| c == '_' || c == '.'))
        .collect()
}

/// Splits `name` into stem and extension (without the dot).
///
/// A leading dot (`.bashrc`) does not start an extension.
pub(crate) fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < name.len() => (&name[..pos], Some(&name[pos + 1..])),
        _ => (name, None),
    }
}

/// Appends `extension` to `stem`, unless the extension is empty.
pub(crate) fn with_extension(stem: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    }
}

/// Parses Content-Disposition header to extract filename.
///
/// Handles both:
/// - `attachment; filename="example.pdf"`
/// - `attachment; filename=example.pdf`
/// - `attachment; filename*=UTF-8''example.pdf` (RFC 5987)
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    if let Some(pos) = header.find("filename*=") {
        let value = header[pos + 10..].trim();
        // Format: charset'language'encoded_value
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            if let Ok(decoded) = urlencoding::decode(encoded[..end].trim()) {
                return Some(decoded.into_owned());
            }
        }
    }

    if let Some(pos) = header.find("filename=") {
        let value = header[pos + 9..].trim();

        if let Some(stripped) = value.strip_prefix('"') {
            if let Some(end) = stripped.find('"') {
                return Some(stripped[..end].to_string());
            }
        } else {
            let end = value.find(';').unwrap_or(value.len());
            let filename = value[..end].trim();
            if !filename.is_empty() {
                return Some(filename.to_string());
            }
        }
    }

    None
}

/// Name the server suggests for a response: Content-Disposition, else the
/// decoded last URL path segment.
pub(crate) fn server_suggested_filename(
    content_disposition: Option<&str>,
    url: &Url,
) -> Option<String> {
    if let Some(name) = content_disposition
        .and_then(parse_content_disposition)
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.is_empty())
    {
        return Some(name);
    }

    let last = url.path_segments()?.next_back()?;
    if last.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(last).map_or_else(|_| last.to_string(), |d| d.into_owned());
    let sanitized = sanitize_filename(&decoded);
    (!sanitized.is_empty()).then_some(sanitized)
}

/// Resolves a file path in `dir` that does not exist yet.
///
/// Example: `file.pdf`, then `file_2.pdf`, `file_3.pdf`, ...
pub(crate) fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    resolve_unique_path_with_suffix_start(dir, filename, 2)
}

/// Resolves a unique file path with configurable duplicate suffix start.
pub(crate) fn resolve_unique_path_with_suffix_start(
    dir: &Path,
    filename: &str,
    suffix_start: usize,
) -> PathBuf {
    let filename = {
        let sanitized = sanitize_filename(filename);
        if sanitized.trim_matches('_').is_empty() {
            "download".to_string()
        } else {
            sanitized
        }
    };
    let base_path = dir.join(&filename);

    if !base_path.exists() {
        return base_path;
    }

    let (stem, extension) = split_extension(&filename);
    let extension = extension.unwrap_or("");

    for i in suffix_start..MAX_DUPLICATE_SUFFIX {
        let new_path = dir.join(with_extension(&format!("{stem}_{i}"), extension));
        if !new_path.exists() {
            return new_path;
        }
    }

    // Fallback (extremely unlikely)
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    dir.join(with_extension(&format!("{stem}_{timestamp}"), extension))
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

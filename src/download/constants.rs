//! Transport defaults.

/// Default HTTP connect timeout in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout in seconds (large documents).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Upper bound accepted for either timeout.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Prefix of temporary download files, kept hidden in listings.
pub const TEMP_FILE_PREFIX: &str = ".linkfile-";

/// Suffix of temporary download files.
pub const TEMP_FILE_SUFFIX: &str = ".part";

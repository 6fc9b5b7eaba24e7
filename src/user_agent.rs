//! User-Agent sent with attachment downloads.

/// Project URL included in the User-Agent so servers can identify the tool.
const PROJECT_UA_URL: &str = "https://github.com/fierce/linkfile";

/// Default User-Agent for download requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("linkfile/{version} (reference-manager; +{PROJECT_UA_URL})")
}

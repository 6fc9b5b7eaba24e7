use std::net::TcpListener;

use wiremock::MockServer;

fn socket_tests_required() -> bool {
    std::env::var("LINKFILE_REQUIRE_SOCKET_TESTS")
        .ok()
        .is_some_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Starts a wiremock server, or returns `None` when localhost sockets are
/// unavailable and `LINKFILE_REQUIRE_SOCKET_TESTS` is not set.
pub(crate) async fn start_mock_server_or_skip() -> Option<MockServer> {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return Some(MockServer::start().await);
    }
    assert!(
        !socket_tests_required(),
        "[socket-bound-test] cannot bind localhost socket and LINKFILE_REQUIRE_SOCKET_TESTS is set"
    );
    eprintln!("[socket-bound-test] cannot bind localhost socket; skipping wiremock-based test");
    None
}

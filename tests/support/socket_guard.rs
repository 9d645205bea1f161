//! Skips wiremock tests where the sandbox forbids binding localhost.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

/// Set to `1`, `true` or `yes` to fail instead of skip.
const REQUIRE_ENV: &str = "CARD_DOWNLOADER_REQUIRE_SOCKET_TESTS";

fn sockets_required() -> bool {
    std::env::var(REQUIRE_ENV)
        .is_ok_and(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Starts a mock server, or returns `None` when no localhost socket can be bound.
#[track_caller]
pub fn start_mock_server_or_skip() -> impl std::future::Future<Output = Option<MockServer>> {
    let caller = Location::caller();
    let can_bind = TcpListener::bind("127.0.0.1:0").is_ok();
    if !can_bind {
        assert!(
            !sockets_required(),
            "{caller}: localhost bind refused and {REQUIRE_ENV} demands socket tests"
        );
        eprintln!("{caller}: localhost bind refused; skipping mock-server test");
    }
    async move {
        if can_bind {
            Some(MockServer::start().await)
        } else {
            None
        }
    }
}

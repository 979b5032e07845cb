// crates/sentinel-broker/tests/http_source.rs
// ============================================================================
// Module: HTTP Source Integration Tests
// Description: Exercises HttpSource against a loopback fixture server.
// Purpose: Verify end-to-end fetch, byte-cap, and status-code handling.
// Dependencies: sentinel-broker, tiny_http
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions are permitted."
)]

use std::thread;

use sentinel_broker::HttpSource;
use sentinel_broker::HttpSourcePolicy;
use sentinel_broker::Source;
use sentinel_broker::SourceError;
use tiny_http::Response;
use tiny_http::Server;

fn spawn_fixture(body: &'static [u8], content_type: &'static str) -> String {
    let server = Server::http("127.0.0.1:0").expect("fixture server binds");
    let addr = server.server_addr().to_ip().expect("loopback address");
    let url = format!("http://{addr}/feed");
    thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let response = Response::from_data(body)
                .with_header(format!("Content-Type: {content_type}").parse::<tiny_http::Header>().expect("valid header"));
            let _ = request.respond(response);
        }
    });
    url
}

#[test]
fn fetches_body_and_content_type_from_loopback_server() {
    let url = spawn_fixture(br#"{"items":[]}"#, "application/json");
    let source =
        HttpSource::with_policy(HttpSourcePolicy::new().allow_private_networks()).expect("client");
    let payload = source.fetch(&url).expect("fetch succeeds");
    assert_eq!(payload.bytes, br#"{"items":[]}"#);
    assert_eq!(payload.content_type.as_deref(), Some("application/json"));
}

#[test]
fn rejects_loopback_server_without_explicit_opt_in() {
    let url = spawn_fixture(b"hello", "text/plain");
    let source = HttpSource::new().expect("client");
    let err = source.fetch(&url).expect_err("denied by default policy");
    assert!(matches!(err, SourceError::Policy(_)));
}

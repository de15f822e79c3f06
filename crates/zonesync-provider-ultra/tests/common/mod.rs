//! Mock UltraDNS API and shared fixtures for the provider contract tests
//!
//! Every test runs against its own `wiremock::MockServer`. Mocks mounted
//! with `.expect(n)` are verified when the server is dropped, so a test
//! fails if the provider issues more (or fewer) requests than the contract
//! allows.

#![allow(dead_code)]

use serde_json::Value;
use std::path::PathBuf;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zonesync_provider_ultra::{Credentials, UltraProvider};

/// Token response as the API sends it (note the spaced "token type")
pub const TOKEN_BODY: &str = r#"{"token type": "Bearer", "refresh_token": "abc", "access_token": "123", "expires_in": "3600"}"#;

/// The API's "no matching resources" body
pub const EMPTY_BODY: &str = r#"[{"errorCode": 70002, "errorMessage": "Data not found."}]"#;

/// Zone served by the paginated fixtures
pub const FIXTURE_ZONE: &str = "octodns1.test.";

pub fn credentials() -> Credentials {
    Credentials::new("user", "pass", "testacct", false)
}

/// Provider pointed at the mock server
pub fn provider(server: &MockServer) -> UltraProvider {
    UltraProvider::with_base_url(credentials(), server.uri()).expect("provider construction")
}

/// Raw contents of `tests/fixtures/<name>`
pub fn fixture(name: &str) -> String {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "fixtures", name]
        .iter()
        .collect();
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path.display(), e))
}

pub fn fixture_json(name: &str) -> Value {
    serde_json::from_str(&fixture(name)).expect("fixture is valid JSON")
}

/// Successful password grant, expected `times` times
pub async fn mount_login(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/v2/authorization/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=user"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN_BODY))
        .expect(times)
        .mount(server)
        .await;
}

/// Zone listing answered with "Data not found"
pub async fn mount_no_zones(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path("/v2/zones"))
        .respond_with(ResponseTemplate::new(404).set_body_string(EMPTY_BODY))
        .expect(times)
        .mount(server)
        .await;
}

/// Two zone pages (10 + 3) listing [`FIXTURE_ZONE`] among others
pub async fn mount_zone_pages(server: &MockServer, times: u64) {
    for (offset, name) in [("0", "ultra-zones-page-1.json"), ("10", "ultra-zones-page-2.json")] {
        Mock::given(method("GET"))
            .and(path("/v2/zones"))
            .and(query_param("q", "zone_type:PRIMARY"))
            .and(query_param("limit", "100"))
            .and(query_param("offset", offset))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture(name)))
            .expect(times)
            .mount(server)
            .await;
    }
}

/// Two rrset pages (10 + 2) for [`FIXTURE_ZONE`]: 11 records plus the SOA
pub async fn mount_record_pages(server: &MockServer, times: u64) {
    for (offset, name) in [
        ("0", "ultra-records-page-1.json"),
        ("10", "ultra-records-page-2.json"),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/v2/zones/{}/rrsets", FIXTURE_ZONE)))
            .and(query_param("limit", "100"))
            .and(query_param("offset", offset))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture(name)))
            .expect(times)
            .mount(server)
            .await;
    }
}

/// Login plus the populated fixture zone
pub async fn mount_populated(server: &MockServer, record_fetches: u64) {
    mount_login(server, 1).await;
    mount_zone_pages(server, 1).await;
    mount_record_pages(server, record_fetches).await;
}

/// `(method, path)` of every request the server saw, token exchange excluded
pub async fn api_calls(server: &MockServer) -> Vec<(String, String)> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .into_iter()
        .filter(|r| r.url.path() != "/v2/authorization/token")
        .map(|r| (r.method.to_string(), r.url.path().to_string()))
        .collect()
}

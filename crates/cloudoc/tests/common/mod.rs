//! Common test utilities for integration tests

#![allow(dead_code)]

use std::time::Duration;

use cloudoc::{AppIdentity, Client, ClientConfig};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ISSUE_PATH: &str = "/open-apis/auth/v3/tenant_access_token/internal";

pub const APP_ID: &str = "cli_it";
pub const APP_SECRET: &str = "it-secret";

/// Creates a client talking to `server` with a one second timeout
pub fn client_for(server: &MockServer) -> Client {
    Client::with_config(
        AppIdentity::new(APP_ID, APP_SECRET),
        ClientConfig::new(server.uri()).with_timeout(1),
    )
}

/// Successful tenant token issuance body
pub fn token_body(token: &str, expire: i64) -> Value {
    json!({"code": 0, "msg": "ok", "tenant_access_token": token, "expire": expire})
}

/// Matcher for an issuance request carrying this suite's identity
pub fn issuance() -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path(ISSUE_PATH))
        .and(body_json(json!({"app_id": APP_ID, "app_secret": APP_SECRET})))
}

/// Mounts an issuance endpoint handing out `token`, expected exactly `times` times
pub async fn mount_token(server: &MockServer, token: &str, times: u64) {
    issuance()
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token, 7200)))
        .expect(times)
        .mount(server)
        .await;
}

/// Mounts an issuance endpoint that answers after `delay`
pub async fn mount_slow_token(server: &MockServer, token: &str, delay: Duration, times: u64) {
    issuance()
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body(token, 7200))
                .set_delay(delay),
        )
        .expect(times)
        .mount(server)
        .await;
}

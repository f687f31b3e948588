//! Mock implementations for testing
//!
//! Re-exports the mocks that live next to the traits they implement and
//! wires them into a ready-to-use client.

use std::sync::Arc;

use crate::auth::AppIdentity;
use crate::client::Client;
use crate::config::ClientConfig;

pub use crate::http::mock::{MockHttpClient, RecordedRequest};
pub use crate::time::ManualClock;

use super::fixtures::{epoch, token_response, BASE_URL, ISSUE_URL};

/// Creates a mock whose issuance endpoint hands out `t-test` for two hours
pub fn authed_mock() -> MockHttpClient {
    MockHttpClient::new().on_json(ISSUE_URL, &token_response("t-test", 7200))
}

/// Creates a client against [`BASE_URL`] whose clock never moves
pub fn test_client(mock: MockHttpClient) -> Client<MockHttpClient> {
    test_client_with_clock(mock, ManualClock::new(epoch()))
}

/// Creates a client against [`BASE_URL`] driven by `clock`
pub fn test_client_with_clock(mock: MockHttpClient, clock: ManualClock) -> Client<MockHttpClient> {
    Client::with_clock(
        AppIdentity::new("cli_test", "secret"),
        ClientConfig::new(BASE_URL).with_timeout(2),
        mock,
        Arc::new(clock),
    )
}

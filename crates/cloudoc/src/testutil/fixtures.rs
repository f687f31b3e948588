//! Test fixtures
//!
//! Canned URLs and wire payloads shared by the unit tests.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

pub const BASE_URL: &str = "https://open.example.com";

/// Tenant token issuance endpoint under [`BASE_URL`]
pub const ISSUE_URL: &str = "https://open.example.com/open-apis/auth/v3/tenant_access_token/internal";

/// Builds a successful tenant token issuance body
pub fn token_response(token: &str, expire: i64) -> Value {
    json!({
        "code": 0,
        "msg": "ok",
        "tenant_access_token": token,
        "expire": expire,
    })
}

/// Wraps `data` in a successful envelope
pub fn ok_envelope(data: Value) -> Value {
    json!({"code": 0, "msg": "success", "data": data})
}

/// Fixed starting instant for manual clocks
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

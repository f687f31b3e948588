//! Typed endpoint wrappers
//!
//! Each wrapper builds a request, hands it to [`Client::call`](crate::Client::call)
//! and decodes the envelope into [`Response`](crate::Response) of its own
//! payload type. None of them add behaviour on top of the client.

mod drive;
mod im;
mod permission;
mod sheets;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::http::HttpRequest;

pub use drive::*;
pub use im::*;
pub use permission::*;
pub use sheets::*;

/// Payload of endpoints that answer with an empty `data` object
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NoData {}

/// Cloud document types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Doc,
    Sheet,
    Bitable,
    Mindnote,
    File,
}

impl DocType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Doc => "doc",
            Self::Sheet => "sheet",
            Self::Bitable => "bitable",
            Self::Mindnote => "mindnote",
            Self::File => "file",
        }
    }
}

/// Percent-encodes a caller supplied path segment
fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Builds a query string from the pairs that carry a value
///
/// Returns an empty string when nothing is set.
fn query(pairs: &[(&str, Option<&str>)]) -> String {
    let encoded: Vec<String> = pairs
        .iter()
        .filter_map(|(key, value)| value.map(|v| format!("{key}={}", urlencoding::encode(v))))
        .collect();

    if encoded.is_empty() {
        String::new()
    } else {
        format!("?{}", encoded.join("&"))
    }
}

/// Attaches `body` as JSON, failing before any I/O if it cannot be encoded
fn with_json<T: Serialize + ?Sized>(request: HttpRequest, body: &T) -> Result<HttpRequest> {
    request
        .json(body)
        .map_err(|e| Error::InvalidRequest(format!("Failed to encode request body: {e}")))
}
